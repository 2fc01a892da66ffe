//! Recipient import/export
//!
//! Two columns per line, `address,amount`, no header and no quoting.
//! Fields are trimmed; blank lines and rows missing either field are dropped
//! on import.

use crate::error::Result;
use crate::recipients::{RecipientEntry, RecipientList};
use std::path::Path;

/// Default file name used when exporting
pub const DEFAULT_EXPORT_FILE: &str = "batch_recipients.csv";

/// Parse recipients from two-column text
pub fn import_recipients(text: &str) -> Vec<RecipientEntry> {
    text.split('\n')
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| {
            let mut fields = line.split(',').map(str::trim);
            let address = fields.next().unwrap_or_default();
            let amount = fields.next().unwrap_or_default();
            if address.is_empty() || amount.is_empty() {
                return None;
            }
            Some(RecipientEntry::new(address, amount))
        })
        .collect()
}

/// Render a list as two-column text, one recipient per line
pub fn export_recipients(list: &RecipientList) -> String {
    list.entries()
        .iter()
        .map(|e| format!("{},{}", e.address, e.amount))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Read and parse a recipients file
pub fn read_recipients_file(path: impl AsRef<Path>) -> Result<Vec<RecipientEntry>> {
    let text = std::fs::read_to_string(path.as_ref())?;
    let entries = import_recipients(&text);
    tracing::debug!(
        "Imported {} recipients from {}",
        entries.len(),
        path.as_ref().display()
    );
    Ok(entries)
}

/// Write a list to a recipients file
pub fn write_recipients_file(path: impl AsRef<Path>, list: &RecipientList) -> Result<()> {
    std::fs::write(path.as_ref(), export_recipients(list))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALICE: &str = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";
    const BOB: &str = "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359";

    #[test]
    fn test_import_trims_and_skips() {
        let text = format!(
            "  {ALICE} ,  1.5 \n\n   \n{BOB},\n,2\r\n{BOB},0.25,extra\n"
        );
        let entries = import_recipients(&text);
        assert_eq!(
            entries,
            vec![
                RecipientEntry::new(ALICE, "1.5"),
                RecipientEntry::new(BOB, "0.25"),
            ]
        );
    }

    #[test]
    fn test_export_then_import_round_trips() {
        let list = RecipientList::from_entries(vec![
            RecipientEntry::new(ALICE, "1.5"),
            RecipientEntry::new(BOB, "0.000000000000000001"),
            RecipientEntry::new(ALICE, "3"),
        ]);
        let text = export_recipients(&list);
        assert_eq!(
            text,
            format!("{ALICE},1.5\n{BOB},0.000000000000000001\n{ALICE},3")
        );
        assert_eq!(RecipientList::from_entries(import_recipients(&text)), list);
    }

    #[test]
    fn test_import_empty_text() {
        assert!(import_recipients("").is_empty());
        assert!(import_recipients("\n \n").is_empty());
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_EXPORT_FILE);
        let list = RecipientList::from_entries(vec![RecipientEntry::new(ALICE, "2")]);

        write_recipients_file(&path, &list).unwrap();
        let entries = read_recipients_file(&path).unwrap();
        assert_eq!(entries, list.entries());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = read_recipients_file("/definitely/not/here.csv");
        assert!(matches!(result, Err(crate::error::Error::Io(_))));
    }
}
