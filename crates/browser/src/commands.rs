//! `wayfarer profiles` subcommands.

use std::io::Write;

use anyhow::Result;
use clap::Subcommand;
use profiles::ProfileStore;

/// Profile management commands.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ProfilesCommand {
    /// List stored profiles
    List,
    /// Create a profile
    Create {
        /// Profile name
        name: String,
    },
    /// Delete a profile and its storage
    Delete {
        /// Profile name
        name: String,
    },
}

/// Run a profile command, writing its report to `out`.
pub fn run_profiles_command(
    store: &ProfileStore,
    command: &ProfilesCommand,
    out: &mut impl Write,
) -> Result<()> {
    match command {
        ProfilesCommand::List => {
            let profiles = store.list()?;
            if profiles.is_empty() {
                writeln!(out, "no profiles in {}", store.directory().display())?;
            }
            for info in profiles {
                writeln!(out, "{}\t{}", info.name, info.root.display())?;
            }
        }
        ProfilesCommand::Create { name } => {
            let profile = store.create(name)?;
            writeln!(out, "created profile '{}' at {}", profile.name(), profile.root().display())?;
        }
        ProfilesCommand::Delete { name } => {
            store.delete(name)?;
            writeln!(out, "deleted profile '{}'", name.trim())?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn run(store: &ProfileStore, command: ProfilesCommand) -> Result<String> {
        let mut out = Vec::new();
        run_profiles_command(store, &command, &mut out)?;
        Ok(String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_create_list_delete() {
        let temp_dir = TempDir::new().unwrap();
        let store = ProfileStore::open(temp_dir.path()).unwrap();

        let output = run(&store, ProfilesCommand::List).unwrap();
        assert!(output.starts_with("no profiles"));

        let output = run(&store, ProfilesCommand::Create { name: "work".into() }).unwrap();
        assert!(output.contains("created profile 'work'"));

        let output = run(&store, ProfilesCommand::List).unwrap();
        assert!(output.starts_with("work\t"));

        run(&store, ProfilesCommand::Delete { name: "work".into() }).unwrap();
        assert!(!store.exists("work").unwrap());
    }

    #[test]
    fn test_errors_surface() {
        let temp_dir = TempDir::new().unwrap();
        let store = ProfileStore::open(temp_dir.path()).unwrap();

        assert!(run(&store, ProfilesCommand::Delete { name: "nobody".into() }).is_err());
        assert!(run(&store, ProfilesCommand::Create { name: "guest".into() }).is_err());
    }
}
