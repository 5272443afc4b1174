//! Disposal of converted originals.
//!
//! Originals are only ever moved to the system trash, never unlinked. When
//! the trash is not available, [`MissingTrashPolicy`] decides how loudly the
//! originals are kept. Conversion itself is never stopped by disposal.

use shared_utils::{ConvertError, Result};
use std::io;
use std::path::Path;
use tracing::{error, info, warn};

/// Reversible deletion backend.
pub trait TrashCan {
    fn is_available(&self) -> bool;
    fn trash(&self, path: &Path) -> io::Result<()>;
}

/// Operator confirmation gate.
pub trait Confirm {
    /// Ask `question`; `Ok(true)` means go ahead.
    fn confirm(&mut self, question: &str) -> io::Result<bool>;
}

/// The platform recycle bin, compiled in with the `trash` feature.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemTrash;

impl TrashCan for SystemTrash {
    fn is_available(&self) -> bool {
        cfg!(feature = "trash")
    }

    #[cfg(feature = "trash")]
    fn trash(&self, path: &Path) -> io::Result<()> {
        trash::delete(path).map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))
    }

    #[cfg(not(feature = "trash"))]
    fn trash(&self, _path: &Path) -> io::Result<()> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "built without trash support",
        ))
    }
}

/// Prompts on the controlling terminal. Without a terminal the answer is
/// empty, which counts as "continue".
#[derive(Debug)]
pub struct TerminalConfirm {
    term: console::Term,
}

impl TerminalConfirm {
    pub fn new() -> Self {
        Self {
            term: console::Term::stderr(),
        }
    }
}

impl Default for TerminalConfirm {
    fn default() -> Self {
        Self::new()
    }
}

impl Confirm for TerminalConfirm {
    fn confirm(&mut self, question: &str) -> io::Result<bool> {
        self.term.write_str(question)?;
        let answer = self.term.read_line()?;
        Ok(!is_refusal(&answer))
    }
}

/// Only an explicit "no" refuses.
pub fn is_refusal(answer: &str) -> bool {
    answer.trim().eq_ignore_ascii_case("no")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum MissingTrashPolicy {
    /// Report the missing trash once and stop deleting for the rest of the run.
    Abort,
    /// Keep the original and carry on.
    Skip,
    /// Ask once; every answer keeps originals from then on.
    #[default]
    Prompt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisposalOutcome {
    Trashed,
    Kept,
}

pub const MISSING_TRASH_QUESTION: &str = "Trash support is not available. Would you like to continue without deleting the original PNG files? (yes/no): ";

pub const ENABLE_TRASH_ADVICE: &str = "Please enable trash support and run png2webp again.";

pub struct Disposer {
    trash: Box<dyn TrashCan>,
    confirm: Box<dyn Confirm>,
    policy: MissingTrashPolicy,
    // set once the missing trash has been reported or answered
    keep_originals: bool,
}

impl Disposer {
    pub fn new(
        trash: Box<dyn TrashCan>,
        confirm: Box<dyn Confirm>,
        policy: MissingTrashPolicy,
    ) -> Self {
        Self {
            trash,
            confirm,
            policy,
            keep_originals: false,
        }
    }

    pub fn system(policy: MissingTrashPolicy) -> Self {
        Self::new(
            Box::new(SystemTrash),
            Box::new(TerminalConfirm::new()),
            policy,
        )
    }

    /// Move `source` to the trash. Only call after its conversion succeeded.
    pub fn dispose(&mut self, source: &Path) -> Result<DisposalOutcome> {
        if self.trash.is_available() {
            self.trash
                .trash(source)
                .map_err(|e| ConvertError::filesystem(source, e))?;
            info!("     Trashed: {}", source.display());
            return Ok(DisposalOutcome::Trashed);
        }

        if self.keep_originals {
            return Ok(DisposalOutcome::Kept);
        }

        match self.policy {
            MissingTrashPolicy::Skip => {
                warn!(
                    "Trash support unavailable, keeping original: {}",
                    source.display()
                );
                Ok(DisposalOutcome::Kept)
            }
            MissingTrashPolicy::Abort => {
                error!("Trash support is unavailable; keeping original PNG files for the rest of the run.");
                self.keep_originals = true;
                Ok(DisposalOutcome::Kept)
            }
            MissingTrashPolicy::Prompt => {
                self.keep_originals = true;
                match self.confirm.confirm(MISSING_TRASH_QUESTION) {
                    Ok(true) => info!("Continuing without deleting the original files."),
                    Ok(false) => error!("{}", ENABLE_TRASH_ADVICE),
                    Err(e) => warn!(
                        "Could not read an answer ({}), keeping original PNG files.",
                        e
                    ),
                }
                Ok(DisposalOutcome::Kept)
            }
        }
    }
}
