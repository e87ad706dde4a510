//! Target properties and the ordered set of properties requested for a run.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A physicochemical property the inference engine can predict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Property {
    /// Octanol-water partition coefficient.
    #[serde(rename = "logP")]
    LogP,
    /// Acid dissociation constant.
    #[serde(rename = "pKa")]
    PKa,
}

impl Property {
    /// All properties in canonical order (logP before pKa).
    pub const ALL: [Property; 2] = [Property::LogP, Property::PKa];

    /// Name of the column appended to the output table.
    pub fn column_name(&self) -> &'static str {
        match self {
            Property::LogP => "logP",
            Property::PKa => "pKa",
        }
    }

    /// Target selector understood by external engines.
    pub fn engine_target(&self) -> &'static str {
        self.column_name()
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

impl FromStr for Property {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "logp" => Ok(Property::LogP),
            "pka" => Ok(Property::PKa),
            _ => Err(format!("Unknown property: {}. Use logP or pKa.", s)),
        }
    }
}

/// Ordered, duplicate-free set of requested properties.
///
/// Iteration always follows [`Property::ALL`], regardless of insertion order,
/// so appended output columns have a stable layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Vec<Property>", into = "Vec<Property>")]
pub struct PropertySet {
    logp: bool,
    pka: bool,
}

impl PropertySet {
    /// An empty set.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Both properties.
    pub fn all() -> Self {
        Self { logp: true, pka: true }
    }

    /// A set containing a single property.
    pub fn only(property: Property) -> Self {
        Self::empty().with(property)
    }

    /// Add a property.
    pub fn with(mut self, property: Property) -> Self {
        match property {
            Property::LogP => self.logp = true,
            Property::PKa => self.pka = true,
        }
        self
    }

    /// Check whether a property is requested.
    pub fn contains(&self, property: Property) -> bool {
        match property {
            Property::LogP => self.logp,
            Property::PKa => self.pka,
        }
    }

    /// Number of requested properties.
    pub fn len(&self) -> usize {
        usize::from(self.logp) + usize::from(self.pka)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Requested properties in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = Property> + '_ {
        Property::ALL.into_iter().filter(|p| self.contains(*p))
    }

    /// Properties that were not requested, in canonical order.
    pub fn missing(&self) -> impl Iterator<Item = Property> + '_ {
        Property::ALL.into_iter().filter(|p| !self.contains(*p))
    }
}

impl From<Vec<Property>> for PropertySet {
    fn from(properties: Vec<Property>) -> Self {
        properties
            .into_iter()
            .fold(PropertySet::empty(), PropertySet::with)
    }
}

impl From<PropertySet> for Vec<Property> {
    fn from(set: PropertySet) -> Self {
        set.iter().collect()
    }
}

impl FromIterator<Property> for PropertySet {
    fn from_iter<I: IntoIterator<Item = Property>>(iter: I) -> Self {
        iter.into_iter().fold(PropertySet::empty(), PropertySet::with)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_order() {
        let set: PropertySet = [Property::PKa, Property::LogP].into_iter().collect();
        let order: Vec<_> = set.iter().collect();
        assert_eq!(order, vec![Property::LogP, Property::PKa]);
    }

    #[test]
    fn test_missing() {
        let set = PropertySet::only(Property::PKa);
        assert_eq!(set.len(), 1);
        assert_eq!(set.missing().collect::<Vec<_>>(), vec![Property::LogP]);
    }

    #[test]
    fn test_parse_and_serde() {
        assert_eq!("LOGP".parse::<Property>().unwrap(), Property::LogP);
        assert!("solubility".parse::<Property>().is_err());

        let json = serde_json::to_string(&PropertySet::all()).unwrap();
        assert_eq!(json, r#"["logP","pKa"]"#);
        let back: PropertySet = serde_json::from_str(r#"["pKa"]"#).unwrap();
        assert_eq!(back, PropertySet::only(Property::PKa));
    }
}
