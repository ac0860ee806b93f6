//! Profile selection dialog.

use common::{ShellError, ShellResult};
use profiles::{Profile, ProfileStore, DEFAULT_PROFILE};

/// Profile picked in the dialog.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProfileChoice {
    /// A stored profile, by name.
    Existing(String),
    /// A throwaway guest session.
    Guest,
}

/// Dialog row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DialogEntry {
    /// Row label.
    pub label: String,
    /// Choice the row stands for.
    pub choice: ProfileChoice,
}

/// Command typed into the text form of the dialog.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DialogCommand {
    /// Pick the row with this 1-based number.
    Pick(usize),
    /// Confirm the selected row.
    Confirm,
    /// Create a profile.
    Create(String),
    /// Delete a profile.
    Delete(String),
    /// Start a guest session.
    Guest,
}

impl DialogCommand {
    /// Parse one line of input.
    ///
    /// Accepted forms: a row number, an empty line, `new <name>`,
    /// `delete <name>` and `guest`.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return Some(DialogCommand::Confirm);
        }
        if let Ok(number) = line.parse::<usize>() {
            return Some(DialogCommand::Pick(number));
        }

        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };
        match (verb.to_ascii_lowercase().as_str(), rest) {
            ("guest" | "g", "") => Some(DialogCommand::Guest),
            ("new" | "n", name) if !name.is_empty() => Some(DialogCommand::Create(name.to_string())),
            ("delete" | "d", name) if !name.is_empty() => {
                Some(DialogCommand::Delete(name.to_string()))
            }
            _ => None,
        }
    }
}

/// Profile selection / creation / deletion dialog.
pub struct ProfileDialog {
    entries: Vec<DialogEntry>,
    selected: Option<usize>,
}

impl ProfileDialog {
    /// Build the dialog from the stored profiles.
    pub fn from_store(store: &ProfileStore) -> ShellResult<Self> {
        let mut dialog = Self {
            entries: Vec::new(),
            selected: None,
        };
        dialog.reload(store)?;
        Ok(dialog)
    }

    fn reload(&mut self, store: &ProfileStore) -> ShellResult<()> {
        let previous = self.selected().cloned();

        self.entries = store
            .list()?
            .into_iter()
            .map(|info| DialogEntry {
                label: info.name.clone(),
                choice: ProfileChoice::Existing(info.name),
            })
            .collect();
        self.entries.push(DialogEntry {
            label: "Guest session".to_string(),
            choice: ProfileChoice::Guest,
        });

        self.selected = previous
            .and_then(|choice| self.position(&choice))
            .or_else(|| self.position(&ProfileChoice::Existing(DEFAULT_PROFILE.to_string())))
            .or(Some(0));
        Ok(())
    }

    fn position(&self, choice: &ProfileChoice) -> Option<usize> {
        self.entries.iter().position(|e| match (&e.choice, choice) {
            (ProfileChoice::Existing(a), ProfileChoice::Existing(b)) => a.eq_ignore_ascii_case(b),
            (a, b) => a == b,
        })
    }

    /// Get the rows.
    pub fn entries(&self) -> &[DialogEntry] {
        &self.entries
    }

    /// Select a row by index.
    pub fn select(&mut self, index: usize) -> bool {
        if index < self.entries.len() {
            self.selected = Some(index);
            true
        } else {
            false
        }
    }

    /// Get the selected choice.
    pub fn selected(&self) -> Option<&ProfileChoice> {
        self.selected
            .and_then(|i| self.entries.get(i))
            .map(|e| &e.choice)
    }

    /// Create a profile and select it.
    pub fn create(&mut self, store: &ProfileStore, name: &str) -> ShellResult<Profile> {
        let profile = store.create(name)?;
        self.selected = None;
        self.reload(store)?;
        self.selected = self.position(&ProfileChoice::Existing(profile.name().to_string()));
        Ok(profile)
    }

    /// Delete a profile; the one in use cannot be deleted.
    pub fn delete(&mut self, store: &ProfileStore, name: &str, active: Option<&str>) -> ShellResult<()> {
        if active.map_or(false, |active| active.eq_ignore_ascii_case(name.trim())) {
            return Err(ShellError::invalid(format!(
                "profile '{}' is in use",
                name.trim()
            )));
        }

        store.delete(name)?;
        self.reload(store)
    }

    /// Apply a typed command; returns the choice once one is confirmed.
    pub fn apply(
        &mut self,
        store: &ProfileStore,
        command: DialogCommand,
        active: Option<&str>,
    ) -> ShellResult<Option<ProfileChoice>> {
        match command {
            DialogCommand::Pick(number) => {
                if number == 0 || !self.select(number - 1) {
                    return Err(ShellError::invalid(format!("no entry {}", number)));
                }
                Ok(self.selected().cloned())
            }
            DialogCommand::Confirm => Ok(self.selected().cloned()),
            DialogCommand::Create(name) => {
                self.create(store, &name)?;
                Ok(None)
            }
            DialogCommand::Delete(name) => {
                self.delete(store, &name, active)?;
                Ok(None)
            }
            DialogCommand::Guest => Ok(Some(ProfileChoice::Guest)),
        }
    }

    /// Text rendering of the dialog, one line per row.
    pub fn render_lines(&self) -> Vec<String> {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                let marker = if self.selected == Some(i) { '*' } else { ' ' };
                format!("{} {}) {}", marker, i + 1, entry.label)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store() -> (TempDir, ProfileStore) {
        let temp_dir = TempDir::new().unwrap();
        let store = ProfileStore::open(temp_dir.path()).unwrap();
        store.ensure_default().unwrap();
        (temp_dir, store)
    }

    #[test]
    fn test_entries_and_default_selection() {
        let (_dir, store) = store();
        store.create("Alpha").unwrap();

        let dialog = ProfileDialog::from_store(&store).unwrap();
        let labels: Vec<_> = dialog.entries().iter().map(|e| e.label.as_str()).collect();

        assert_eq!(labels, vec!["Alpha", "default", "Guest session"]);
        assert_eq!(
            dialog.selected(),
            Some(&ProfileChoice::Existing(DEFAULT_PROFILE.to_string()))
        );
    }

    #[test]
    fn test_create_selects_new_profile() {
        let (_dir, store) = store();
        let mut dialog = ProfileDialog::from_store(&store).unwrap();

        dialog.create(&store, "work").unwrap();
        assert_eq!(dialog.selected(), Some(&ProfileChoice::Existing("work".into())));
        assert_eq!(dialog.entries().len(), 3);

        assert!(dialog.create(&store, "WORK").is_err());
    }

    #[test]
    fn test_delete_rules() {
        let (_dir, store) = store();
        let mut dialog = ProfileDialog::from_store(&store).unwrap();
        dialog.create(&store, "work").unwrap();

        let err = dialog.delete(&store, "Work", Some("work")).unwrap_err();
        assert!(matches!(err, ShellError::InvalidOperation(_)));

        let err = dialog.delete(&store, DEFAULT_PROFILE, None).unwrap_err();
        assert!(matches!(err, ShellError::InvalidOperation(_)));

        dialog.delete(&store, "work", Some(DEFAULT_PROFILE)).unwrap();
        assert_eq!(dialog.entries().len(), 2);
        assert_eq!(
            dialog.selected(),
            Some(&ProfileChoice::Existing(DEFAULT_PROFILE.to_string()))
        );
    }

    #[test]
    fn test_command_parsing() {
        assert_eq!(DialogCommand::parse(""), Some(DialogCommand::Confirm));
        assert_eq!(DialogCommand::parse(" 2 "), Some(DialogCommand::Pick(2)));
        assert_eq!(DialogCommand::parse("guest"), Some(DialogCommand::Guest));
        assert_eq!(
            DialogCommand::parse("new  My Work"),
            Some(DialogCommand::Create("My Work".into()))
        );
        assert_eq!(DialogCommand::parse("d old"), Some(DialogCommand::Delete("old".into())));
        assert_eq!(DialogCommand::parse("new"), None);
        assert_eq!(DialogCommand::parse("bogus"), None);
    }

    #[test]
    fn test_apply_flow() {
        let (_dir, store) = store();
        let mut dialog = ProfileDialog::from_store(&store).unwrap();

        let outcome = dialog
            .apply(&store, DialogCommand::Create("work".into()), None)
            .unwrap();
        assert_eq!(outcome, None);

        let outcome = dialog.apply(&store, DialogCommand::Confirm, None).unwrap();
        assert_eq!(outcome, Some(ProfileChoice::Existing("work".into())));

        assert!(dialog.apply(&store, DialogCommand::Pick(0), None).is_err());
        assert!(dialog.apply(&store, DialogCommand::Pick(9), None).is_err());

        let outcome = dialog.apply(&store, DialogCommand::Pick(3), None).unwrap();
        assert_eq!(outcome, Some(ProfileChoice::Guest));
    }

    #[test]
    fn test_render_lines() {
        let (_dir, store) = store();
        let dialog = ProfileDialog::from_store(&store).unwrap();

        assert_eq!(
            dialog.render_lines(),
            vec!["* 1) default".to_string(), "  2) Guest session".to_string()]
        );
    }
}
