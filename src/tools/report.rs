//! Read-only slot reports.
//!
//! Reports copy the header under the header lock and never take the content
//! lock. Each call rescans; a report is a snapshot, not a live view.

use std::fmt;

use crate::buffer::{SharedCache, SlotDescriptor, SlotHeader};
use crate::common::{BlockNumber, Oid, RelFileLocator, SlotId};
use crate::tools::predicate::{belongs_to_relation, is_resident_and_valid};

/// What a slot holds, as seen at one instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotDescription {
    pub slot: SlotId,
    pub block_number: BlockNumber,
    pub fork_name: &'static str,
    pub relation_number: Oid,
    pub database_id: Oid,
    pub tablespace_id: Oid,
    pub dirty: bool,
    pub usage_count: u32,
    pub pin_count: u32,
}

impl SlotDescription {
    fn from_header(slot: SlotId, header: &SlotHeader) -> Self {
        Self {
            slot,
            block_number: header.tag.block_number,
            fork_name: header.tag.fork_number.name(),
            relation_number: header.tag.relation_number,
            database_id: header.tag.database_id,
            tablespace_id: header.tag.tablespace_id,
            dirty: header.state.is_dirty(),
            usage_count: header.state.usage_count(),
            pin_count: header.state.pin_count(),
        }
    }
}

impl fmt::Display for SlotDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "buffer {}: {}/{}/{} {} blk {} dirty={} usage={} pins={}",
            self.slot,
            self.tablespace_id,
            self.database_id,
            self.relation_number,
            self.fork_name,
            self.block_number,
            self.dirty,
            self.usage_count,
            self.pin_count
        )
    }
}

/// Describe `slot`, or `None` if it holds no valid page.
pub fn describe(slot: &SlotDescriptor) -> Option<SlotDescription> {
    let header = slot.header();
    is_resident_and_valid(&header).then(|| SlotDescription::from_header(slot.id(), &header))
}

/// Every shared slot holding a page of `locator`, in slot order.
pub fn relation_slots(cache: &SharedCache, locator: &RelFileLocator) -> Vec<SlotDescription> {
    cache
        .slots()
        .iter()
        .filter_map(|slot| {
            let header = slot.header();
            (header.state.is_tag_valid() && belongs_to_relation(&header, locator))
                .then(|| SlotDescription::from_header(slot.id(), &header))
        })
        .collect()
}
