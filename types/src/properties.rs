//! Property sheet model presented by the host's settings UI.

use crate::PropertyValue;
use serde::{Deserialize, Serialize};

/// Whether a list accepts free text in addition to its items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComboType {
    Editable,
    List,
}

/// Value type stored by a list property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComboFormat {
    Int,
    String,
}

/// A selectable entry of a list property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListItem {
    /// Text shown to the user
    pub label: String,
    /// Value written to the settings when selected
    pub value: PropertyValue,
}

/// Kind-specific data of a property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PropertyKind {
    List {
        combo_type: ComboType,
        format: ComboFormat,
        items: Vec<ListItem>,
    },
    Float {
        min: f64,
        max: f64,
        step: f64,
        slider: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        suffix: Option<String>,
    },
    Group {
        properties: Properties,
    },
    /// Read-only informational text (may contain links).
    Info { text: String },
}

/// A single entry of the property sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    /// Settings key this property edits (used as identifier)
    pub name: String,
    /// Human-readable label
    pub label: String,
    /// Tooltip / long description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub long_description: Option<String>,
    /// Whether the UI currently shows this property
    pub visible: bool,
    /// Whether the host should call back when the value changes
    pub has_modified_callback: bool,
    pub kind: PropertyKind,
}

impl Property {
    pub fn new(name: &str, label: &str, kind: PropertyKind) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            long_description: None,
            visible: true,
            has_modified_callback: false,
            kind,
        }
    }

    /// Append an item to a list property. No-op for other kinds.
    pub fn list_add(&mut self, label: &str, value: impl Into<PropertyValue>) {
        if let PropertyKind::List { items, .. } = &mut self.kind {
            items.push(ListItem {
                label: label.to_string(),
                value: value.into(),
            });
        }
    }

    /// Remove every item of a list property. No-op for other kinds.
    pub fn list_clear(&mut self) {
        if let PropertyKind::List { items, .. } = &mut self.kind {
            items.clear();
        }
    }

    /// Items of a list property (empty for other kinds).
    pub fn list_items(&self) -> &[ListItem] {
        match &self.kind {
            PropertyKind::List { items, .. } => items,
            _ => &[],
        }
    }
}

/// Ordered collection of properties, possibly nested in groups.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Properties {
    pub properties: Vec<Property>,
}

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, property: Property) -> &mut Property {
        self.properties.push(property);
        let last = self.properties.len() - 1;
        &mut self.properties[last]
    }

    /// Add an editable or fixed string/int list.
    pub fn add_list(
        &mut self,
        name: &str,
        label: &str,
        combo_type: ComboType,
        format: ComboFormat,
    ) -> &mut Property {
        self.add(Property::new(
            name,
            label,
            PropertyKind::List {
                combo_type,
                format,
                items: Vec::new(),
            },
        ))
    }

    pub fn add_float(
        &mut self,
        name: &str,
        label: &str,
        min: f64,
        max: f64,
        step: f64,
    ) -> &mut Property {
        self.add(Property::new(
            name,
            label,
            PropertyKind::Float {
                min,
                max,
                step,
                slider: false,
                suffix: None,
            },
        ))
    }

    pub fn add_float_slider(
        &mut self,
        name: &str,
        label: &str,
        min: f64,
        max: f64,
        step: f64,
    ) -> &mut Property {
        self.add(Property::new(
            name,
            label,
            PropertyKind::Float {
                min,
                max,
                step,
                slider: true,
                suffix: None,
            },
        ))
    }

    pub fn add_group(&mut self, name: &str, label: &str, group: Properties) -> &mut Property {
        self.add(Property::new(
            name,
            label,
            PropertyKind::Group { properties: group },
        ))
    }

    pub fn add_info(&mut self, name: &str, text: &str) -> &mut Property {
        self.add(Property::new(
            name,
            "",
            PropertyKind::Info {
                text: text.to_string(),
            },
        ))
    }

    /// Find a property by name, searching nested groups.
    pub fn get(&self, name: &str) -> Option<&Property> {
        for property in &self.properties {
            if property.name == name {
                return Some(property);
            }
            if let PropertyKind::Group { properties } = &property.kind {
                if let Some(found) = properties.get(name) {
                    return Some(found);
                }
            }
        }
        None
    }

    /// Mutable variant of [`Properties::get`].
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Property> {
        for property in &mut self.properties {
            if property.name == name {
                return Some(property);
            }
            if let PropertyKind::Group { properties } = &mut property.kind {
                if let Some(found) = properties.get_mut(name) {
                    return Some(found);
                }
            }
        }
        None
    }

    pub fn set_visible(&mut self, name: &str, visible: bool) {
        if let Some(property) = self.get_mut(name) {
            property.visible = visible;
        }
    }
}

/// Attach a unit suffix to a float property. No-op for other kinds.
pub fn set_float_suffix(property: &mut Property, unit: &str) {
    if let PropertyKind::Float { suffix, .. } = &mut property.kind {
        *suffix = Some(unit.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_searches_groups() {
        let mut group = Properties::new();
        group.add_float("inner", "Inner", 0.0, 1.0, 0.1);

        let mut props = Properties::new();
        props.add_float("outer", "Outer", 0.0, 1.0, 0.1);
        props.add_group("group", "Group", group);

        assert!(props.get("outer").is_some());
        assert!(props.get("inner").is_some());
        assert!(props.get("missing").is_none());

        props.set_visible("inner", false);
        assert!(!props.get("inner").unwrap().visible);
    }

    #[test]
    fn test_list_items() {
        let mut props = Properties::new();
        let list = props.add_list("filter", "Filter", ComboType::Editable, ComboFormat::String);
        list.list_add("None", "filter");
        list.list_add("Blur", "Blur");
        assert_eq!(list.list_items().len(), 2);

        list.list_clear();
        assert!(list.list_items().is_empty());
    }

    #[test]
    fn test_float_suffix() {
        let mut props = Properties::new();
        let p = props.add_float("duration", "Duration", 0.0, 30000.0, 100.0);
        set_float_suffix(p, " ms");
        match &p.kind {
            PropertyKind::Float { suffix, .. } => assert_eq!(suffix.as_deref(), Some(" ms")),
            other => panic!("unexpected kind {:?}", other),
        }
    }
}
