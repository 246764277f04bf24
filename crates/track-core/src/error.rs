//! Error and diagnostic types.
//!
//! Failures split into three classes with different handling policies:
//!
//! - **Structural corruption** ([`TrackError`]): bad magic, truncated buffer,
//!   out-of-range section offset. Fatal; a load aborts.
//! - **Record corruption** ([`LoadDiagnostic`]): one group/point/cross-reference
//!   record is out of range. Recovered by skipping the record; the diagnostic
//!   is collected for the caller to display.
//! - **Capacity violations** ([`EditError`]): an interactive mutation would
//!   exceed a node or link budget. Rejected synchronously at the call site so
//!   the editing layer can surface a message and abandon the gesture; nothing
//!   is silently truncated.

use crate::entities::SectionKind;

/// Fatal file-level errors raised while decoding or encoding a course file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackError {
    /// The file does not start with the course-container magic.
    BadMagic {
        /// The four bytes actually found at the start of the buffer.
        found: [u8; 4],
    },
    /// The header declares a format version this kernel does not understand.
    UnsupportedVersion(u32),
    /// A read ran past the end of the buffer.
    Truncated {
        /// Byte offset at which the read started.
        offset: usize,
        /// Number of bytes the read needed.
        needed: usize,
        /// Total buffer length.
        len: usize,
    },
    /// A section-table offset points outside the buffer.
    SectionOffset {
        /// Index of the section in the header table.
        section: usize,
        /// The offending absolute byte offset.
        offset: usize,
        /// Total buffer length.
        len: usize,
    },
    /// A category holds more records than its section can express.
    SectionOverflow {
        /// The section being encoded.
        section: SectionKind,
        /// Number of records present.
        count: usize,
        /// Maximum the section format can store.
        limit: usize,
    },
}

impl std::fmt::Display for TrackError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrackError::BadMagic { found } => {
                write!(f, "bad file magic: {found:02x?}")
            }
            TrackError::UnsupportedVersion(version) => {
                write!(f, "unsupported format version: {version:#x}")
            }
            TrackError::Truncated {
                offset,
                needed,
                len,
            } => {
                write!(
                    f,
                    "truncated file: {needed} byte(s) needed at offset {offset}, buffer is {len}"
                )
            }
            TrackError::SectionOffset {
                section,
                offset,
                len,
            } => {
                write!(
                    f,
                    "section {section} offset {offset} is outside the {len}-byte buffer"
                )
            }
            TrackError::SectionOverflow {
                section,
                count,
                limit,
            } => {
                write!(
                    f,
                    "{} records in {section:?} section, format stores at most {limit}",
                    count
                )
            }
        }
    }
}

impl std::error::Error for TrackError {}

/// Synchronous rejection of a mutation that would exceed a capacity bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditError {
    /// Adding a node would exceed the category's record capacity.
    NodeCapacity {
        /// Maximum node count for the category.
        limit: usize,
    },
    /// Linking would exceed the source node's outgoing-degree bound.
    OutgoingLinks {
        /// Maximum total outgoing multiplicity per node.
        limit: usize,
    },
    /// Linking would exceed the target node's incoming-degree bound.
    IncomingLinks {
        /// Maximum total incoming multiplicity per node.
        limit: usize,
    },
    /// An operation referenced a node that is no longer in the graph.
    StaleNode,
}

impl std::fmt::Display for EditError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EditError::NodeCapacity { limit } => {
                write!(f, "category is full ({limit} nodes)")
            }
            EditError::OutgoingLinks { limit } => {
                write!(f, "node already has {limit} outgoing connections")
            }
            EditError::IncomingLinks { limit } => {
                write!(f, "node already has {limit} incoming connections")
            }
            EditError::StaleNode => {
                write!(f, "operation referenced a removed node")
            }
        }
    }
}

impl std::error::Error for EditError {}

/// One recovered record-corruption event from a load.
///
/// Collected in order of discovery and returned alongside the document so a
/// frontend can show what was dropped. Also emitted through `log::warn!`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadDiagnostic {
    /// Section in which the bad record was found.
    pub section: SectionKind,
    /// Record index within the section (file order).
    pub record: usize,
    /// Human-readable description of what was wrong.
    pub message: String,
}

impl std::fmt::Display for LoadDiagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:?} record {}: {}",
            self.section, self.record, self.message
        )
    }
}
