//! Terminal form of the profile dialog.

use std::io::{BufRead, Write};

use anyhow::{bail, Result};
use profiles::ProfileStore;
use tracing::debug;
use ui::{DialogCommand, ProfileChoice, ProfileDialog};

const HELP: &str = "number = pick, enter = confirm, new <name>, delete <name>, guest";

/// Ask on `output` which profile to use, reading commands from `input`.
///
/// Creation and deletion errors are reported and the prompt continues. End
/// of input confirms the current selection.
pub fn choose_profile<R: BufRead, W: Write>(
    store: &ProfileStore,
    mut input: R,
    mut output: W,
) -> Result<ProfileChoice> {
    let mut dialog = ProfileDialog::from_store(store)?;

    loop {
        writeln!(output, "Choose a profile:")?;
        for line in dialog.render_lines() {
            writeln!(output, "{}", line)?;
        }
        write!(output, "[{}] > ", HELP)?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            writeln!(output)?;
            return match dialog.selected() {
                Some(choice) => Ok(choice.clone()),
                None => bail!("no profile chosen"),
            };
        }

        let Some(command) = DialogCommand::parse(&line) else {
            writeln!(output, "unrecognised input: {}", line.trim())?;
            continue;
        };
        debug!(?command, "profile prompt");

        match dialog.apply(store, command, None) {
            Ok(Some(choice)) => return Ok(choice),
            Ok(None) => {}
            Err(e) => writeln!(output, "error: {}", e)?,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tempfile::TempDir;

    fn store() -> (TempDir, ProfileStore) {
        let temp_dir = TempDir::new().unwrap();
        let store = ProfileStore::open(temp_dir.path()).unwrap();
        store.ensure_default().unwrap();
        (temp_dir, store)
    }

    fn ask(store: &ProfileStore, script: &str) -> (Result<ProfileChoice>, String) {
        let mut output = Vec::new();
        let choice = choose_profile(store, Cursor::new(script.to_string()), &mut output);
        (choice, String::from_utf8(output).unwrap())
    }

    #[test]
    fn test_confirm_default() {
        let (_dir, store) = store();
        let (choice, output) = ask(&store, "\n");

        assert_eq!(choice.unwrap(), ProfileChoice::Existing("default".into()));
        assert!(output.contains("* 1) default"));
    }

    #[test]
    fn test_create_then_confirm() {
        let (_dir, store) = store();
        let (choice, _) = ask(&store, "new work\n\n");

        assert_eq!(choice.unwrap(), ProfileChoice::Existing("work".into()));
        assert!(store.exists("work").unwrap());
    }

    #[test]
    fn test_errors_keep_prompting() {
        let (_dir, store) = store();
        let (choice, output) = ask(&store, "delete default\nbogus\nguest\n");

        assert_eq!(choice.unwrap(), ProfileChoice::Guest);
        assert!(output.contains("error:"));
        assert!(output.contains("unrecognised input: bogus"));
    }

    #[test]
    fn test_end_of_input_confirms() {
        let (_dir, store) = store();
        let (choice, _) = ask(&store, "2");

        // "2" without a newline still reads as a line.
        assert_eq!(choice.unwrap(), ProfileChoice::Guest);

        let (choice, _) = ask(&store, "");
        assert_eq!(choice.unwrap(), ProfileChoice::Existing("default".into()));
    }
}
