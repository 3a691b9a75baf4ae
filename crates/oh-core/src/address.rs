//! Address hierarchy selection with cascading resets.

use serde::{Deserialize, Serialize};

/// Primary key of an address lookup record.
pub type AddressId = u64;

/// Levels of the administrative address hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddressLevel {
    Division,
    District,
    Upazila,
    Union,
    PostOffice,
    Village,
    Para,
}

impl AddressLevel {
    pub const ALL: [AddressLevel; 7] = [
        AddressLevel::Division,
        AddressLevel::District,
        AddressLevel::Upazila,
        AddressLevel::Union,
        AddressLevel::PostOffice,
        AddressLevel::Village,
        AddressLevel::Para,
    ];

    /// Level whose selection filters this one. Post offices and villages both
    /// belong to a union.
    pub fn parent(&self) -> Option<AddressLevel> {
        match self {
            AddressLevel::Division => None,
            AddressLevel::District => Some(AddressLevel::Division),
            AddressLevel::Upazila => Some(AddressLevel::District),
            AddressLevel::Union => Some(AddressLevel::Upazila),
            AddressLevel::PostOffice | AddressLevel::Village => Some(AddressLevel::Union),
            AddressLevel::Para => Some(AddressLevel::Village),
        }
    }

    pub fn is_descendant_of(&self, ancestor: AddressLevel) -> bool {
        let mut current = self.parent();
        while let Some(level) = current {
            if level == ancestor {
                return true;
            }
            current = level.parent();
        }
        false
    }

    pub fn descendants(&self) -> Vec<AddressLevel> {
        AddressLevel::ALL
            .into_iter()
            .filter(|level| level.is_descendant_of(*self))
            .collect()
    }

    /// Collection segment of the lookup endpoint.
    pub fn collection(&self) -> &'static str {
        match self {
            AddressLevel::Division => "divisions",
            AddressLevel::District => "zillas",
            AddressLevel::Upazila => "upazilas",
            AddressLevel::Union => "unions",
            AddressLevel::PostOffice => "postoffices",
            AddressLevel::Village => "villages",
            AddressLevel::Para => "paras",
        }
    }

    /// Query parameter naming this level when it filters a child collection.
    pub fn filter_param(&self) -> &'static str {
        match self {
            AddressLevel::Division => "division",
            AddressLevel::District => "zilla",
            AddressLevel::Upazila => "upazila",
            AddressLevel::Union => "union",
            AddressLevel::PostOffice => "postoffice",
            AddressLevel::Village => "village",
            AddressLevel::Para => "para",
        }
    }
}

impl std::str::FromStr for AddressLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "division" => Ok(AddressLevel::Division),
            "district" | "zilla" => Ok(AddressLevel::District),
            "upazila" => Ok(AddressLevel::Upazila),
            "union" => Ok(AddressLevel::Union),
            "post_office" | "postoffice" => Ok(AddressLevel::PostOffice),
            "village" => Ok(AddressLevel::Village),
            "para" => Ok(AddressLevel::Para),
            other => Err(format!("unknown address level: {other}")),
        }
    }
}

/// One entry of a lookup list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressOption {
    pub id: AddressId,
    pub name: String,
}

/// Filter for a lookup request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParentFilter {
    /// Top level, no filter.
    Root,
    /// Filter by the selected parent.
    Parent(AddressLevel, AddressId),
    /// The parent level has no selection yet.
    Unselected(AddressLevel),
}

/// Selected ids per level.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AddressSelection {
    pub division: Option<AddressId>,
    pub district: Option<AddressId>,
    pub upazila: Option<AddressId>,
    pub union: Option<AddressId>,
    pub post_office: Option<AddressId>,
    pub village: Option<AddressId>,
    pub para: Option<AddressId>,
}

impl AddressSelection {
    pub fn get(&self, level: AddressLevel) -> Option<AddressId> {
        *self.slot(level)
    }

    /// Selects `id` at `level`. A changed value clears every descendant level;
    /// re-selecting the current value leaves the selection untouched.
    pub fn select(&mut self, level: AddressLevel, id: AddressId) {
        if self.get(level) == Some(id) {
            return;
        }
        *self.slot_mut(level) = Some(id);
        self.clear_descendants(level);
    }

    /// Clears `level` and everything below it.
    pub fn clear(&mut self, level: AddressLevel) {
        *self.slot_mut(level) = None;
        self.clear_descendants(level);
    }

    /// How a lookup for `level` must be filtered given the current selection.
    pub fn parent_filter(&self, level: AddressLevel) -> ParentFilter {
        match level.parent() {
            None => ParentFilter::Root,
            Some(parent) => match self.get(parent) {
                Some(id) => ParentFilter::Parent(parent, id),
                None => ParentFilter::Unselected(parent),
            },
        }
    }

    pub fn is_complete(&self) -> bool {
        AddressLevel::ALL.iter().all(|level| self.get(*level).is_some())
    }

    fn clear_descendants(&mut self, level: AddressLevel) {
        for descendant in level.descendants() {
            *self.slot_mut(descendant) = None;
        }
    }

    fn slot(&self, level: AddressLevel) -> &Option<AddressId> {
        match level {
            AddressLevel::Division => &self.division,
            AddressLevel::District => &self.district,
            AddressLevel::Upazila => &self.upazila,
            AddressLevel::Union => &self.union,
            AddressLevel::PostOffice => &self.post_office,
            AddressLevel::Village => &self.village,
            AddressLevel::Para => &self.para,
        }
    }

    fn slot_mut(&mut self, level: AddressLevel) -> &mut Option<AddressId> {
        match level {
            AddressLevel::Division => &mut self.division,
            AddressLevel::District => &mut self.district,
            AddressLevel::Upazila => &mut self.upazila,
            AddressLevel::Union => &mut self.union,
            AddressLevel::PostOffice => &mut self.post_office,
            AddressLevel::Village => &mut self.village,
            AddressLevel::Para => &mut self.para,
        }
    }
}
