use bstr::{BStr, BString, ByteSlice};

use fnv::FnvHashMap;

#[cfg(feature = "serde1")]
use serde::{Deserialize, Serialize};

/// Bidirectional map between byte-string names and dense `u32` ids,
/// in insertion order. Used for segment names and for the path (or
/// stable sequence) names segments are tagged with.
#[derive(Default, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
pub struct NameMap {
    name_map: FnvHashMap<BString, u32>,
    inverse_map: Vec<BString>,
}

impl NameMap {
    pub fn new() -> Self {
        Default::default()
    }

    /// Return the id of `name`, adding it if it isn't already present.
    pub fn get_or_insert<N: AsRef<[u8]>>(&mut self, name: N) -> u32 {
        let name = name.as_ref();
        if let Some(id) = self.name_map.get(name.as_bstr()) {
            return *id;
        }
        let id = self.inverse_map.len() as u32;
        self.name_map.insert(BString::from(name), id);
        self.inverse_map.push(BString::from(name));
        id
    }

    pub fn map_name<N: AsRef<[u8]>>(&self, name: N) -> Option<u32> {
        self.name_map.get(name.as_ref().as_bstr()).copied()
    }

    pub fn inverse_map_name(&self, id: u32) -> Option<&'_ BStr> {
        self.inverse_map.get(id as usize).map(|bs| bs.as_bstr())
    }

    pub fn len(&self) -> usize {
        self.inverse_map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inverse_map.is_empty()
    }

    pub fn clear(&mut self) {
        self.name_map.clear();
        self.inverse_map.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &'_ BStr)> {
        self.inverse_map
            .iter()
            .enumerate()
            .map(|(i, n)| (i as u32, n.as_bstr()))
    }
}
