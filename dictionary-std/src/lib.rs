//! This crate implements the standard attribute dictionary.
//!
//! The records cover the attribute groups handled by this workspace,
//! indexed lazily on first use. Unknown private and group length
//! tags resolve to their generic entries, as in the standard.

mod entries;
pub mod tags;

pub use crate::entries::{Record, ENTRIES};

use dcmio_core::dictionary::{DataDictionary, DictEntry, VirtualVr};
use dcmio_core::{Tag, VM, VR};
use once_cell::sync::Lazy;
use std::collections::HashMap;

static DICT: Lazy<StandardDataDictionaryRegistry> = Lazy::new(init_dictionary);

/// Retrieve a singleton instance of the standard dictionary registry.
///
/// Note that one does not generally have to call this:
/// the unit type [`StandardDataDictionary`]
/// already provides a lazily loaded singleton
/// implementing the necessary traits.
#[inline]
pub fn registry() -> &'static StandardDataDictionaryRegistry {
    &DICT
}

/// The data struct actually containing the standard dictionary index.
///
/// This structure is made opaque via the unit type
/// [`StandardDataDictionary`].
#[derive(Debug)]
pub struct StandardDataDictionaryRegistry {
    /// mapping: tag → entry
    by_tag: HashMap<Tag, &'static DictEntry>,
}

fn init_dictionary() -> StandardDataDictionaryRegistry {
    let mut by_tag = HashMap::with_capacity(ENTRIES.len());
    for (tag, entry) in ENTRIES {
        by_tag.insert(*tag, entry);
    }
    StandardDataDictionaryRegistry { by_tag }
}

/// Generic group length dictionary entry,
/// covering any attribute of the form `(gggg,0000)`
/// without its own record.
static GROUP_LENGTH_ENTRY: DictEntry =
    DictEntry::new(VirtualVr::Exact(VR::UL), VM::VM1, "GenericGroupLength");

/// Generic private creator dictionary entry,
/// covering any tag from `(gggg,0010)` to `(gggg,00FF)`
/// where `gggg` is odd. The multiplicity is left unresolved so that
/// the count can be derived from the encoded value.
static PRIVATE_CREATOR_ENTRY: DictEntry =
    DictEntry::new(VirtualVr::Exact(VR::LO), VM::VM0, "PrivateCreator");

/// A data element dictionary which consults
/// the library's standard attribute registry.
///
/// The dictionary index is automatically initialized upon the first use.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StandardDataDictionary;

impl StandardDataDictionary {
    fn indexed_tag(tag: Tag) -> Option<&'static DictEntry> {
        registry().by_tag.get(&tag).copied().or_else(|| {
            if tag.is_private_creator() {
                return Some(&PRIVATE_CREATOR_ENTRY);
            }
            if tag.is_group_length() {
                return Some(&GROUP_LENGTH_ENTRY);
            }
            None
        })
    }
}

impl DataDictionary for StandardDataDictionary {
    fn by_tag(&self, tag: Tag) -> Option<&DictEntry> {
        StandardDataDictionary::indexed_tag(tag)
    }
}
