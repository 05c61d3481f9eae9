//! src/prompt/edit_mode.rs
//! ============================================================================
//! # EditMode: blocking line prompts for changing the active wallpaper
//!
//! Entered by typing `edit` in live mode, after the terminal has been handed
//! back. One command runs, then the program ends. Generic over its line
//! source and sink so tests drive it from memory.

use std::{
    fmt::Display,
    fs,
    io::{BufRead, Write},
    path::{Path, PathBuf},
    str::FromStr,
};

use crossterm::style::Stylize;
use rand::seq::SliceRandom;
use tracing::{info, warn};

use crate::{
    controller::dispatcher::Refresher,
    error::AppError,
    external::{DateTimeOverlay, Externals, assets, backup::backup_item},
    model::{
        catalog::Catalog,
        list_file::{append_line, ensure_list_file, read_lines},
        query::EDIT_KEYWORD,
        session::Session,
        tags::extract_tags,
    },
};

const PROMPT: &str = "> ";

pub const ILLEGAL_NAME_CHARS: &[char] = &['\\', '/', ':', '*', '?', '"', '<', '>', '|'];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditCommand {
    Rename,
    Fav,
    Unfav,
    Delete,
    PCurrent,
    CreateNew,
    Mark,
}

impl EditCommand {
    pub const ALL: [(&'static str, Self); 7] = [
        ("rename", Self::Rename),
        ("fav", Self::Fav),
        ("unfav", Self::Unfav),
        ("delete", Self::Delete),
        ("pcurrent", Self::PCurrent),
        ("create-new", Self::CreateNew),
        ("mark", Self::Mark),
    ];

    fn keywords() -> Vec<&'static str> {
        Self::ALL.iter().map(|(k, _)| *k).collect()
    }
}

impl FromStr for EditCommand {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        Self::ALL
            .iter()
            .find(|(keyword, _)| *keyword == lower)
            .map(|(_, cmd)| *cmd)
            .ok_or_else(|| AppError::invalid_input("command", format!("Invalid input '{lower}'")))
    }
}

/// Why a proposed wallpaper name is unusable, if it is.
pub fn validate_name(name: &str, catalog: &Catalog) -> Result<(), AppError> {
    if name.is_empty() {
        return Err(AppError::invalid_input("name", "Name cannot be empty"));
    }
    if catalog.contains(name) {
        return Err(AppError::invalid_input("name", "Name already exists"));
    }
    if name.contains(ILLEGAL_NAME_CHARS) {
        let listed: Vec<String> = ILLEGAL_NAME_CHARS.iter().map(char::to_string).collect();
        return Err(AppError::invalid_input(
            "name",
            format!("Name cannot contain any of the following characters: {}", listed.join(", ")),
        ));
    }
    Ok(())
}

/// Files and folders edit mode writes to.
#[derive(Debug, Clone)]
pub struct EditSettings {
    pub to_edit_path: PathBuf,
    pub backups_dir: PathBuf,
    /// What a leading `~` in a media path expands to.
    pub home: PathBuf,
}

pub struct EditMode<'a, R: BufRead, W: Write> {
    input: R,
    out: W,
    session: &'a mut Session,
    externals: &'a Externals,
    settings: EditSettings,
    lines_read: usize,
}

impl<'a, R: BufRead, W: Write> EditMode<'a, R, W> {
    pub fn new(
        input: R,
        out: W,
        session: &'a mut Session,
        externals: &'a Externals,
        settings: EditSettings,
    ) -> Self {
        Self {
            input,
            out,
            session,
            externals,
            settings,
            lines_read: 0,
        }
    }

    /// Show the menu, read one command and run it.
    pub fn run(&mut self) -> Result<(), AppError> {
        info!("Edit mode started");
        self.print_menu()?;

        let command = loop {
            let line = self.read_line()?;
            match line.parse::<EditCommand>() {
                Ok(cmd) => break cmd,
                Err(_) => {
                    writeln!(self.out, "Invalid input '{}'", line.trim().to_lowercase())?;
                    writeln!(self.out, "Valid inputs are: {}", EditCommand::keywords().join(", "))?;
                }
            }
        };
        info!("Edit command: {:?}", command);

        match command {
            EditCommand::CreateNew => self.create_new(),
            other => {
                let Some(active) = self.session.active_name().map(str::to_string) else {
                    writeln!(self.out, "[ERROR] No active wallpaper is recorded in the properties file")?;
                    return Ok(());
                };
                match other {
                    EditCommand::Rename => self.rename(&active),
                    EditCommand::Fav => self.favorite(&active),
                    EditCommand::Unfav => self.unfavorite(&active),
                    EditCommand::Delete => self.delete(&active),
                    EditCommand::PCurrent => self.print_and_copy_path(&active),
                    EditCommand::Mark => self.mark(&active),
                    EditCommand::CreateNew => Ok(()),
                }
            }
        }
    }

    fn print_menu(&mut self) -> Result<(), AppError> {
        writeln!(self.out, "{}", "Edit mode".red().on_black())?;
        writeln!(
            self.out,
            "The 'Active Wallpaper' is the one the renderer shows, or showed last if it is not running.\n"
        )?;
        writeln!(self.out, "Active Wallpaper:")?;
        writeln!(self.out, "{}\n", self.session.active_name().unwrap_or("<none>").green())?;

        let entries: [(&str, &str); 7] = [
            ("rename", "rename the Active Wallpaper"),
            ("fav", "add the Active Wallpaper to favorites"),
            ("unfav", "remove the Active Wallpaper from favorites"),
            ("delete", "delete the Active Wallpaper"),
            ("pcurrent", "print the path to the Active Wallpaper and copy it to the clipboard"),
            ("create-new", "create a new wallpaper from a video file"),
            ("mark", "add the Active Wallpaper to the to-edit list"),
        ];
        for (keyword, help) in entries {
            writeln!(self.out, "Enter {} to {}", keyword.cyan(), help)?;
        }
        Ok(())
    }

    /// One line without its terminator. The first line can carry the
    /// keystrokes that typed `edit` in live mode; only the text after the
    /// last `edit` on it is kept.
    fn read_line(&mut self) -> Result<String, AppError> {
        write!(self.out, "{PROMPT}")?;
        self.out.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            warn!("Input closed while edit mode was waiting");
            return Err(AppError::Cancelled);
        }
        self.lines_read += 1;

        let mut line = line.trim_end_matches(['\n', '\r']).to_string();
        if self.lines_read == 1 {
            if let Some(pos) = line.rfind(EDIT_KEYWORD) {
                line = line[pos + EDIT_KEYWORD.len()..].to_string();
            }
        }
        Ok(line)
    }

    fn ask(&mut self, question: impl Display) -> Result<String, AppError> {
        writeln!(self.out, "{question}")?;
        self.read_line()
    }

    fn confirm(&mut self, question: impl Display) -> Result<bool, AppError> {
        Ok(self.ask(question)?.trim().eq_ignore_ascii_case("y"))
    }

    /// Keep asking until the answer is empty (default) or parses.
    fn ask_parsed<T: FromStr>(&mut self, question: &str, default: T) -> Result<T, AppError> {
        writeln!(self.out, "{question}")?;
        writeln!(self.out, "ENTER to skip (select default)")?;
        loop {
            let answer = self.read_line()?;
            let answer = answer.trim();
            if answer.is_empty() {
                return Ok(default);
            }
            match answer.parse() {
                Ok(value) => return Ok(value),
                Err(_) => writeln!(self.out, "'{answer}' is not valid here. Try again:")?,
            }
        }
    }

    fn ask_choice(&mut self, question: &str, choices: &[&str], default: String) -> Result<String, AppError> {
        writeln!(self.out, "{question}")?;
        writeln!(self.out, "ENTER to skip (select default)")?;
        loop {
            let answer = self.read_line()?;
            let answer = answer.trim();
            if answer.is_empty() {
                return Ok(default);
            }
            if choices.iter().any(|c| c.eq_ignore_ascii_case(answer)) {
                return Ok(answer.to_lowercase());
            }
            writeln!(self.out, "Invalid selection. Must be one of {}. Try again:", choices.join(", "))?;
        }
    }

    fn ask_new_name(&mut self) -> Result<String, AppError> {
        loop {
            let name = self.read_line()?.trim().to_string();
            match validate_name(&name, &self.session.catalog) {
                Ok(()) => return Ok(name),
                Err(AppError::InvalidInput { message, .. }) => {
                    writeln!(self.out, "{message}")?;
                    writeln!(self.out, "Try again")?;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Offer a backup of the folder about to change. A failed backup asks
    /// whether to go on; anything but `y` cancels.
    fn offer_backup(&mut self, name: &str) -> Result<(), AppError> {
        writeln!(self.out, "Wallpaper: {}", name.green())?;
        writeln!(self.out, "\nWallpaper is about to be modified")?;
        if !self.confirm(format!(
            "Create a backup of the wallpaper folder in {}? (y/n)",
            self.settings.backups_dir.display()
        ))? {
            return Ok(());
        }

        match backup_item(&self.session.catalog, name, &self.settings.backups_dir) {
            Ok(dest) => {
                writeln!(self.out, "Backup created at {}", dest.display())?;
                Ok(())
            }
            Err(e) => {
                warn!("{}", e);
                writeln!(self.out, "[ERROR] {e}")?;
                if self.confirm("Backup failed. Continue anyway? (y/n)")? {
                    Ok(())
                } else {
                    writeln!(self.out, "Aborting")?;
                    Err(AppError::Cancelled)
                }
            }
        }
    }

    fn report_refresh(&mut self, failures: Vec<AppError>) -> Result<(), AppError> {
        for failure in failures {
            writeln!(self.out, "[WARNING] {failure}")?;
        }
        Ok(())
    }

    /// The folder step failed after the renderer was stopped: bring it back
    /// on the unchanged wallpaper, then report the failure.
    fn abort_with_restart(&mut self, mut failures: Vec<AppError>, error: AppError) -> Result<(), AppError> {
        warn!("Folder change failed, restarting the renderer: {}", error);
        if let Err(e) = self.externals.process.start() {
            failures.push(e);
        }
        self.report_refresh(failures)?;
        Err(error)
    }

    fn rename(&mut self, active: &str) -> Result<(), AppError> {
        let tags = extract_tags(self.session.catalog.names());
        writeln!(self.out, "Tags found: {}", tags.join(", "))?;
        writeln!(self.out, "Enter new name for '{}'", active.green())?;
        let new_name = self.ask_new_name()?;

        writeln!(self.out, "Renaming '{active}' to '{new_name}' ...")?;
        self.offer_backup(active)?;

        let externals = self.externals;
        let mut failures = Vec::new();
        if let Err(e) = externals.process.stop() {
            failures.push(e);
        }
        let root = self.session.catalog.root();
        if let Err(e) = fs::rename(root.join(active), root.join(&new_name)) {
            return self.abort_with_restart(failures, e.into());
        }
        if let Err(e) = externals.store.set_active_name(&new_name) {
            failures.push(e);
        }
        if let Err(e) = externals.process.start() {
            failures.push(e);
        }
        self.report_refresh(failures)?;
        self.session.set_active_name(new_name.clone());

        if self.session.favorites.contains(active) {
            writeln!(self.out, "Updating references to '{active}' in favorites ...")?;
            self.session.favorites.rename(active, &new_name)?;
        }

        info!("Renamed '{}' to '{}'", active, new_name);
        writeln!(self.out, "Done.")?;
        Ok(())
    }

    fn favorite(&mut self, active: &str) -> Result<(), AppError> {
        match self.session.favorites.add(active) {
            Ok(()) => writeln!(self.out, "Added '{}' to favorites", active.green())?,
            Err(e @ AppError::AlreadyFavorite(_)) => {
                writeln!(self.out, "[WARNING] {e}")?;
                writeln!(self.out, "[WARNING] Aborting add to favorites")?;
            }
            Err(e) => return Err(e),
        }
        Ok(())
    }

    fn unfavorite(&mut self, active: &str) -> Result<(), AppError> {
        match self.session.favorites.remove(active) {
            Ok(()) => writeln!(self.out, "Removed '{}' from favorites", active.green())?,
            Err(e @ AppError::NotFavorite(_)) => {
                writeln!(self.out, "[WARNING] {e}")?;
                writeln!(self.out, "[WARNING] Aborting remove from favorites")?;
            }
            Err(e) => return Err(e),
        }
        Ok(())
    }

    fn delete(&mut self, active: &str) -> Result<(), AppError> {
        writeln!(self.out, "Wallpaper: {}", active.green())?;
        writeln!(
            self.out,
            "\nWARNING: This will delete the wallpaper folder and all its contents. This cannot be undone."
        )?;
        if !self.confirm("Delete the wallpaper listed above? (y/n)")?
            || !self.confirm("Are you sure you want to delete this wallpaper? (y/n)")?
        {
            writeln!(self.out, "Aborting delete")?;
            return Err(AppError::Cancelled);
        }
        self.offer_backup(active)?;

        writeln!(self.out, "Deleting '{}' ...", active.green())?;
        let externals = self.externals;
        let mut failures = Vec::new();
        if let Err(e) = externals.process.stop() {
            failures.push(e);
        }
        if let Err(e) = fs::remove_dir_all(self.session.catalog.path_of(active)) {
            return self.abort_with_restart(failures, e.into());
        }
        writeln!(self.out, "Deleted '{}'", active.green())?;

        if self.session.favorites.contains(active) {
            self.session.favorites.remove(active)?;
        }

        // one draw, used for both the message and the properties file
        let replacement = self.pick_replacement(active);
        match &replacement {
            Some(name) => {
                writeln!(self.out, "Setting replacement to '{}' ...", name.as_str().green())?;
                if let Err(e) = externals.store.set_active_name(name) {
                    failures.push(e);
                }
            }
            None => writeln!(self.out, "[WARNING] Nothing left to use as a replacement")?,
        }

        if let Err(e) = externals.process.start() {
            failures.push(e);
        }
        self.report_refresh(failures)?;
        if let Some(name) = replacement {
            self.session.set_active_name(name);
        }
        info!("Deleted '{}'", active);
        Ok(())
    }

    /// Random favorite, else random catalog item other than `deleted`.
    fn pick_replacement(&self, deleted: &str) -> Option<String> {
        let mut rng = rand::thread_rng();
        let favorites: Vec<&String> = self
            .session
            .favorites
            .entries()
            .iter()
            .filter(|n| *n != deleted)
            .collect();
        if let Some(name) = favorites.choose(&mut rng) {
            return Some((*name).clone());
        }
        let others: Vec<&String> = self
            .session
            .catalog
            .names()
            .iter()
            .filter(|n| *n != deleted)
            .collect();
        others.choose(&mut rng).map(|name| (*name).clone())
    }

    fn print_and_copy_path(&mut self, active: &str) -> Result<(), AppError> {
        let path = self.session.catalog.path_of(active);
        writeln!(self.out, "Path to Active Wallpaper:\n{}", path.display())?;

        if let Err(e) = self.externals.clipboard.copy(&path.to_string_lossy()) {
            warn!("Clipboard copy failed: {}", e);
            writeln!(self.out, "[ERROR] {e}")?;
        }
        Ok(())
    }

    fn mark(&mut self, active: &str) -> Result<(), AppError> {
        let path = self.settings.to_edit_path.clone();
        ensure_list_file(&path)?;
        if read_lines(&path)?.iter().any(|line| line == active) {
            writeln!(self.out, "[WARNING] Wallpaper '{active}' is already in {}", path.display())?;
            return Ok(());
        }
        append_line(&path, active)?;
        writeln!(self.out, "Added '{}' to {}", active.green(), path.display())?;
        Ok(())
    }

    fn create_new(&mut self) -> Result<(), AppError> {
        writeln!(self.out, "What should the wallpaper be called?")?;
        writeln!(self.out, "ENTER nothing to default to the video file name")?;
        let mut name = loop {
            let name = self.read_line()?.trim().to_string();
            if name.is_empty() {
                break name;
            }
            match validate_name(&name, &self.session.catalog) {
                Ok(()) => break name,
                Err(AppError::InvalidInput { message, .. }) => {
                    writeln!(self.out, "{message}")?;
                    writeln!(self.out, "Try again")?;
                }
                Err(e) => return Err(e),
            }
        };

        writeln!(self.out, "Enter the path to the video file")?;
        let media = loop {
            let raw = self.read_line()?;
            let path = expand_home(raw.trim(), &self.settings.home);
            if path.is_file() {
                break path;
            }
            writeln!(self.out, "File does not exist or is a directory. Try again:")?;
        };
        let media = fs::canonicalize(&media).unwrap_or(media);

        if name.is_empty() {
            name = default_name_for(&media);
            if let Err(e) = validate_name(&name, &self.session.catalog) {
                writeln!(self.out, "[ERROR] Cannot use '{name}': {e}")?;
                return Ok(());
            }
        }

        let overlay = self.ask_overlay()?;
        match self.externals.assets.create_from_media(&media, &name, &overlay) {
            Ok(folder) => {
                writeln!(self.out, "Created {}", folder.display())?;
                let failures = Refresher::new(self.externals).refresh(&name);
                self.report_refresh(failures)?;
                self.session.set_active_name(name);
            }
            Err(e) => {
                warn!("Creating '{}' failed: {}", name, e);
                writeln!(self.out, "[ERROR] {e}")?;
            }
        }
        Ok(())
    }

    fn ask_overlay(&mut self) -> Result<DateTimeOverlay, AppError> {
        let mut overlay = DateTimeOverlay::default();
        if !self.confirm("Show Date and Time? (y/n)")? {
            return Ok(overlay);
        }
        overlay.visible = true;
        overlay.parallax = self.confirm("Parallax? (y/n)")?;
        overlay.margin_top = self.ask_parsed("Margin Top? (int)", overlay.margin_top)?;
        overlay.margin_right = self.ask_parsed("Margin Right? (int)", overlay.margin_right)?;
        overlay.margin_left = self.ask_parsed("Margin Left? (int)", overlay.margin_left)?;
        overlay.margin_bottom = self.ask_parsed("Margin Bottom? (int)", overlay.margin_bottom)?;
        overlay.rotation_x = self.ask_parsed("Rotation X? (int)", overlay.rotation_x)?;
        overlay.rotation_y = self.ask_parsed("Rotation Y? (int)", overlay.rotation_y)?;
        overlay.rotation_z = self.ask_parsed("Rotation Z? (int)", overlay.rotation_z)?;
        overlay.position = self.ask_choice(
            "Position? (center, top, bottom, left, right)",
            assets::POSITIONS,
            overlay.position.clone(),
        )?;
        overlay.alignment = self.ask_choice(
            "Alignment? (center, left, right)",
            assets::ALIGNMENTS,
            overlay.alignment.clone(),
        )?;
        let on_top = self.ask("Always on top? (y/n)\nENTER to skip (select default)")?;
        if !on_top.trim().is_empty() {
            overlay.always_on_top = on_top.trim().eq_ignore_ascii_case("y");
        }
        overlay.color = self.ask_parsed("Color? (hex)", overlay.color.clone())?;
        overlay.alpha = self.ask_parsed("Alpha? (int)", overlay.alpha)?;
        overlay.shadow_color = self.ask_parsed("Shadow Color? (hex)", overlay.shadow_color.clone())?;
        overlay.shadow_alpha = self.ask_parsed("Shadow Alpha? (int)", overlay.shadow_alpha)?;
        overlay.time_font =
            self.ask_parsed("Time Font? Formatted like 'Lato Light 30'", overlay.time_font.clone())?;
        overlay.date_font =
            self.ask_parsed("Date Font? Formatted like 'Lato Light 20'", overlay.date_font.clone())?;
        Ok(overlay)
    }
}

fn expand_home(raw: &str, home: &Path) -> PathBuf {
    match raw.strip_prefix('~') {
        Some(rest) => home.join(rest.trim_start_matches(['/', '\\'])),
        None => PathBuf::from(raw),
    }
}

/// File name up to its first dot.
fn default_name_for(media: &Path) -> String {
    media
        .file_name()
        .map(|n| n.to_string_lossy())
        .and_then(|n| n.split('.').next().map(str::to_string))
        .unwrap_or_default()
}
