use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::FormItem;
use crate::core::FhirVersion;
use crate::fhir::{Coding, Extension, Identifier};

/// The form model produced by importing a Questionnaire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormDefinition {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_system: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub code_list: Vec<Coding>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub identifier: Vec<Identifier>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subject_type: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub terminology_server: Option<String>,
    pub fhir_version: FhirVersion,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extension: Vec<Extension>,
    /// Form-level resource fields carried over untouched.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub fhir_fields: Map<String, Value>,
    #[serde(default)]
    pub items: Vec<FormItem>,
}

impl FormDefinition {
    pub fn new(fhir_version: FhirVersion) -> Self {
        Self {
            id: None,
            url: None,
            version: None,
            name: None,
            title: None,
            status: None,
            date: None,
            publisher: None,
            description: None,
            code: None,
            code_system: None,
            code_list: Vec::new(),
            identifier: Vec::new(),
            subject_type: Vec::new(),
            terminology_server: None,
            fhir_version,
            extension: Vec::new(),
            fhir_fields: Map::new(),
            items: Vec::new(),
        }
    }

    pub fn with_items(mut self, items: Vec<FormItem>) -> Self {
        self.items = items;
        self
    }

    /// Depth-first search for the first item with the given linkId.
    pub fn find_item(&self, link_id: &str) -> Option<&FormItem> {
        self.items.iter().find_map(|item| {
            if item.link_id == link_id {
                Some(item)
            } else {
                item.find_item(link_id)
            }
        })
    }

    /// Every item with the given linkId, in tree order.
    pub fn find_all(&self, link_id: &str) -> Vec<&FormItem> {
        let mut found = Vec::new();
        self.visit(&mut |item| {
            if item.link_id == link_id {
                found.push(item);
            }
        });
        found
    }

    /// Calls `f` on every item, parents before children.
    pub fn visit<'a>(&'a self, f: &mut impl FnMut(&'a FormItem)) {
        fn walk<'a>(items: &'a [FormItem], f: &mut impl FnMut(&'a FormItem)) {
            for item in items {
                f(item);
                walk(&item.items, f);
            }
        }
        walk(&self.items, f);
    }

    /// Item addressed by child indices from the root.
    pub fn item_at_path_mut(&mut self, path: &[usize]) -> Option<&mut FormItem> {
        let (first, rest) = path.split_first()?;
        let mut item = self.items.get_mut(*first)?;
        for index in rest {
            item = item.items.get_mut(*index)?;
        }
        Some(item)
    }
}
