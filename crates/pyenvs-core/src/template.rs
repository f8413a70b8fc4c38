use std::collections::BTreeMap;

/// Key-value data handed to a template at render time.
pub type TemplateData = BTreeMap<String, toml::Value>;

/// Template reference as written in `environments.toml`.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateSpec {
    /// Template directory name under the templates root
    pub name: String,
    /// Caller-supplied data, keys normalized to `snake_case`
    pub data: TemplateData,
}

impl TemplateSpec {
    /// Create a spec, replacing `-` with `_` in every data key so the keys
    /// are valid template identifiers.
    pub fn new(name: impl Into<String>, data: TemplateData) -> Self {
        let data = data
            .into_iter()
            .map(|(key, value)| (key.replace('-', "_"), value))
            .collect();
        Self {
            name: name.into(),
            data,
        }
    }
}

/// A template bound to one image.
///
/// The data bag is assembled once from, in increasing priority: the
/// defaults for the template name, the configured data, and the `image` and
/// `version` keys of the owning image. It is never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    name: String,
    data: TemplateData,
}

impl Template {
    pub(crate) fn for_image(spec: TemplateSpec, image: &str, version: &str) -> Self {
        let mut data = defaults(&spec.name);
        data.extend(spec.data);
        data.insert("image".to_owned(), toml::Value::String(image.to_owned()));
        data.insert(
            "version".to_owned(),
            toml::Value::String(version.to_owned()),
        );
        Self {
            name: spec.name,
            data,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data(&self) -> &TemplateData {
        &self.data
    }
}

/// Per-template default data.
fn defaults(template: &str) -> TemplateData {
    match template {
        "debian" => TemplateData::from([
            ("has_distutils".to_owned(), toml::Value::Boolean(false)),
            ("has_pypy2".to_owned(), toml::Value::Boolean(false)),
        ]),
        _ => TemplateData::new(),
    }
}
