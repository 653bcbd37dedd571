use std::fmt;

use serde::Deserialize;
use serde_json::{json, Map, Value};

// Field bits understood by the on-device uiautomator server.
const MASK_TEXT: u32 = 0x01;
const MASK_TEXT_CONTAINS: u32 = 0x02;
const MASK_CLASS_NAME: u32 = 0x10;
const MASK_CLASS_NAME_MATCHES: u32 = 0x20;
const MASK_DESCRIPTION: u32 = 0x40;
const MASK_DESCRIPTION_CONTAINS: u32 = 0x80;
const MASK_PACKAGE_NAME: u32 = 0x08_0000;
const MASK_RESOURCE_ID: u32 = 0x20_0000;
const MASK_RESOURCE_ID_MATCHES: u32 = 0x40_0000;
const MASK_INSTANCE: u32 = 0x0100_0000;

/// A UI element query. Every set field must match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selector {
    text: Option<String>,
    text_contains: Option<String>,
    class_name: Option<String>,
    class_name_matches: Option<String>,
    description: Option<String>,
    description_contains: Option<String>,
    package_name: Option<String>,
    resource_id: Option<String>,
    resource_id_matches: Option<String>,
    instance: Option<u32>,
}

impl Selector {
    pub fn resource_id(id: impl Into<String>) -> Self {
        Self {
            resource_id: Some(id.into()),
            ..Self::default()
        }
    }

    pub fn resource_id_matches(pattern: impl Into<String>) -> Self {
        Self {
            resource_id_matches: Some(pattern.into()),
            ..Self::default()
        }
    }

    pub fn class_name(class: impl Into<String>) -> Self {
        Self {
            class_name: Some(class.into()),
            ..Self::default()
        }
    }

    /// `pattern` is a Java regular expression matched against the full class name.
    pub fn class_name_matches(pattern: impl Into<String>) -> Self {
        Self {
            class_name_matches: Some(pattern.into()),
            ..Self::default()
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn text_contains(text: impl Into<String>) -> Self {
        Self {
            text_contains: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn description(description: impl Into<String>) -> Self {
        Self {
            description: Some(description.into()),
            ..Self::default()
        }
    }

    pub fn description_contains(description: impl Into<String>) -> Self {
        Self {
            description_contains: Some(description.into()),
            ..Self::default()
        }
    }

    pub fn in_package(mut self, package: impl Into<String>) -> Self {
        self.package_name = Some(package.into());
        self
    }

    /// Restrict to the n-th match (0-based) in hierarchy order.
    pub fn instance(mut self, instance: u32) -> Self {
        self.instance = Some(instance);
        self
    }

    /// The JSON object the uiautomator JSON-RPC methods take as a selector.
    pub fn to_rpc(&self) -> Value {
        let mut fields = Map::new();
        let mut mask = 0u32;
        let mut put = |bit: u32, key: &str, value: Option<Value>| {
            if let Some(value) = value {
                mask |= bit;
                fields.insert(key.to_string(), value);
            }
        };
        let string = |v: &Option<String>| v.as_ref().map(|s| Value::String(s.clone()));

        put(MASK_TEXT, "text", string(&self.text));
        put(MASK_TEXT_CONTAINS, "textContains", string(&self.text_contains));
        put(MASK_CLASS_NAME, "className", string(&self.class_name));
        put(
            MASK_CLASS_NAME_MATCHES,
            "classNameMatches",
            string(&self.class_name_matches),
        );
        put(MASK_DESCRIPTION, "description", string(&self.description));
        put(
            MASK_DESCRIPTION_CONTAINS,
            "descriptionContains",
            string(&self.description_contains),
        );
        put(MASK_PACKAGE_NAME, "packageName", string(&self.package_name));
        put(MASK_RESOURCE_ID, "resourceId", string(&self.resource_id));
        put(
            MASK_RESOURCE_ID_MATCHES,
            "resourceIdMatches",
            string(&self.resource_id_matches),
        );
        put(MASK_INSTANCE, "instance", self.instance.map(|i| json!(i)));

        fields.insert("mask".to_string(), json!(mask));
        fields.insert("childOrSibling".to_string(), json!([]));
        fields.insert("childOrSiblingSelector".to_string(), json!([]));
        Value::Object(fields)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts = [
            ("text", self.text.as_deref()),
            ("textContains", self.text_contains.as_deref()),
            ("className", self.class_name.as_deref()),
            ("classNameMatches", self.class_name_matches.as_deref()),
            ("description", self.description.as_deref()),
            ("descriptionContains", self.description_contains.as_deref()),
            ("packageName", self.package_name.as_deref()),
            ("resourceId", self.resource_id.as_deref()),
            ("resourceIdMatches", self.resource_id_matches.as_deref()),
        ];
        let mut first = true;
        for (key, value) in parts {
            if let Some(value) = value {
                if !first {
                    write!(f, ", ")?;
                }
                write!(f, "{key}={value:?}")?;
                first = false;
            }
        }
        if let Some(instance) = self.instance {
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "instance={instance}")?;
        }
        Ok(())
    }
}

/// Screen rectangle in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct Bounds {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Bounds {
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn center(&self) -> (i32, i32) {
        ((self.left + self.right) / 2, (self.top + self.bottom) / 2)
    }

    pub fn is_empty(&self) -> bool {
        self.right <= self.left || self.bottom <= self.top
    }
}

/// The subset of an element's accessibility info the driver looks at.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementInfo {
    #[serde(default)]
    pub bounds: Bounds,
    pub class_name: Option<String>,
    pub text: Option<String>,
    pub resource_name: Option<String>,
    pub content_description: Option<String>,
}

impl ElementInfo {
    pub fn at(bounds: Bounds) -> Self {
        Self {
            bounds,
            ..Self::default()
        }
    }
}
