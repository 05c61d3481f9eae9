pub mod error;
pub use error::AppError;

pub mod config;

pub mod logging;
pub use logging::Logger;

pub mod model {
    pub mod catalog;
    pub use catalog::Catalog;

    pub mod list_file;

    pub mod favorites;
    pub use favorites::Favorites;
    pub mod history;
    pub use history::History;

    pub mod tags;

    pub mod query;
    pub use query::{Direction, Mode, QueryState};

    pub mod session;
    pub use session::{Notification, NotificationLevel, Session};
}

pub mod controller {
    pub mod actions;
    pub use actions::{Action, SelectionTrigger};

    pub mod key_interpreter;
    pub use key_interpreter::{KeyInterpreter, KeyName, KeyPhase, RawKey};

    pub mod dispatcher;

    pub mod event_loop;
    pub use event_loop::{EventLoop, LoopOutcome};
}

pub mod input {
    pub mod terminal;
    pub use terminal::{InputEvent, input_channel, spawn_reader, spawn_signal_listener};
}

pub mod external;

pub mod prompt {
    pub mod edit_mode;
    pub use edit_mode::{EditMode, EditSettings};
}

pub mod view {
    pub mod theme;

    pub mod ui;
}
