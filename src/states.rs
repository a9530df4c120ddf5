//! Indian states and territories offered by the add-item form.

use std::fmt;
use std::str::FromStr;

/// A state or union territory a search item may name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndiaState {
    AndhraPradesh,
    ArunachalPradesh,
    Assam,
    Bihar,
    Chhattisgarh,
    Goa,
    Gujarat,
    Haryana,
    HimachalPradesh,
    Jharkhand,
    Karnataka,
    Kerala,
    MadhyaPradesh,
    Maharashtra,
    Manipur,
    Meghalaya,
    Mizoram,
    Nagaland,
    Odisha,
    Punjab,
    Rajasthan,
    Sikkim,
    TamilNadu,
    Telangana,
    Tripura,
    UttarPradesh,
    Uttarakhand,
    WestBengal,
    Delhi,
}

impl IndiaState {
    /// Display name, as sent to the extraction service.
    pub fn name(&self) -> &'static str {
        match self {
            Self::AndhraPradesh => "Andhra Pradesh",
            Self::ArunachalPradesh => "Arunachal Pradesh",
            Self::Assam => "Assam",
            Self::Bihar => "Bihar",
            Self::Chhattisgarh => "Chhattisgarh",
            Self::Goa => "Goa",
            Self::Gujarat => "Gujarat",
            Self::Haryana => "Haryana",
            Self::HimachalPradesh => "Himachal Pradesh",
            Self::Jharkhand => "Jharkhand",
            Self::Karnataka => "Karnataka",
            Self::Kerala => "Kerala",
            Self::MadhyaPradesh => "Madhya Pradesh",
            Self::Maharashtra => "Maharashtra",
            Self::Manipur => "Manipur",
            Self::Meghalaya => "Meghalaya",
            Self::Mizoram => "Mizoram",
            Self::Nagaland => "Nagaland",
            Self::Odisha => "Odisha",
            Self::Punjab => "Punjab",
            Self::Rajasthan => "Rajasthan",
            Self::Sikkim => "Sikkim",
            Self::TamilNadu => "Tamil Nadu",
            Self::Telangana => "Telangana",
            Self::Tripura => "Tripura",
            Self::UttarPradesh => "Uttar Pradesh",
            Self::Uttarakhand => "Uttarakhand",
            Self::WestBengal => "West Bengal",
            Self::Delhi => "Delhi",
        }
    }

    /// Every state, in form order.
    pub fn all() -> &'static [IndiaState] {
        &[
            Self::AndhraPradesh,
            Self::ArunachalPradesh,
            Self::Assam,
            Self::Bihar,
            Self::Chhattisgarh,
            Self::Goa,
            Self::Gujarat,
            Self::Haryana,
            Self::HimachalPradesh,
            Self::Jharkhand,
            Self::Karnataka,
            Self::Kerala,
            Self::MadhyaPradesh,
            Self::Maharashtra,
            Self::Manipur,
            Self::Meghalaya,
            Self::Mizoram,
            Self::Nagaland,
            Self::Odisha,
            Self::Punjab,
            Self::Rajasthan,
            Self::Sikkim,
            Self::TamilNadu,
            Self::Telangana,
            Self::Tripura,
            Self::UttarPradesh,
            Self::Uttarakhand,
            Self::WestBengal,
            Self::Delhi,
        ]
    }
}

impl fmt::Display for IndiaState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for IndiaState {
    type Err = String;

    /// Case-insensitive; `_` and `-` count as spaces and runs of
    /// whitespace collapse, so `tamil_nadu` and `TAMIL  NADU` both match.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s
            .replace(['_', '-'], " ")
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();
        Self::all()
            .iter()
            .copied()
            .find(|state| state.name().to_lowercase() == wanted)
            .ok_or_else(|| format!("unknown state {s:?}; run `college-finder states` for the list"))
    }
}
