use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDateTime;

use crate::template::{Template, TemplateSpec};

/// Format of the generated version of rolling images (minute granularity).
const ROLLING_VERSION_FORMAT: &str = "%Y%m%d.%H%M";

/// How an image's version is determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageKind {
    /// Version supplied by configuration.
    Static,
    /// Version generated from the construction time, additionally tagged `latest`.
    Rolling,
}

/// A named, versioned container build target.
///
/// # Examples
///
/// ```
/// use pyenvs_core::{Image, TemplateData, TemplateSpec};
///
/// let image = Image::new_static("debian", "12", TemplateSpec::new("debian", TemplateData::new()));
/// assert_eq!(image.id(), "debian:12");
/// assert_eq!(image.tags("0.3.0"), ["debian:12", "debian:12-pc0.3.0"]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    name: String,
    version: String,
    kind: ImageKind,
    template: Template,
}

impl Image {
    /// Create an image whose version comes from configuration.
    pub fn new_static(
        name: impl Into<String>,
        version: impl Into<String>,
        template: TemplateSpec,
    ) -> Self {
        Self::with_kind(name.into(), version.into(), ImageKind::Static, template)
    }

    /// Create a rolling image versioned after the current local time.
    pub fn rolling(name: impl Into<String>, template: TemplateSpec) -> Self {
        Self::rolling_at(name, template, chrono::Local::now().naive_local())
    }

    /// Create a rolling image versioned after `at`.
    pub fn rolling_at(name: impl Into<String>, template: TemplateSpec, at: NaiveDateTime) -> Self {
        let version = at.format(ROLLING_VERSION_FORMAT).to_string();
        Self::with_kind(name.into(), version, ImageKind::Rolling, template)
    }

    fn with_kind(name: String, version: String, kind: ImageKind, template: TemplateSpec) -> Self {
        let template = Template::for_image(template, &name, &version);
        Self {
            name,
            version,
            kind,
            template,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn kind(&self) -> ImageKind {
        self.kind
    }

    pub fn template(&self) -> &Template {
        &self.template
    }

    /// Unique key of the image, `name:version`.
    pub fn id(&self) -> String {
        format!("{}:{}", self.name, self.version)
    }

    /// Local tags for this image.
    ///
    /// `release` is the toolchain release identifier, see [`crate::release`].
    pub fn tags(&self, release: &str) -> Vec<String> {
        let mut tags = vec![
            // upstream tag
            format!("{}:{}", self.name, self.version),
            // source-versioned tag
            format!("{}:{}-pc{release}", self.name, self.version),
        ];
        if self.kind == ImageKind::Rolling {
            tags.push(format!("{}:latest", self.name));
        }
        tags
    }
}

/// Collection of images keyed by [`Image::id`], iterated in id order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImagesContainer {
    images: BTreeMap<String, Image>,
}

impl ImagesContainer {
    /// Build a container. If two images share an id, the later one wins.
    pub fn new(images: impl IntoIterator<Item = Image>) -> Self {
        let mut map = BTreeMap::new();
        for image in images {
            let id = image.id();
            if map.insert(id.clone(), image).is_some() {
                tracing::warn!(id = %id, "duplicate image id; keeping the last definition");
            }
        }
        Self { images: map }
    }

    /// Look up one image by id.
    ///
    /// # Errors
    ///
    /// [`crate::Error::UnknownImage`] if `id` is not in the container.
    pub fn get(&self, id: &str) -> crate::Result<&Image> {
        self.images.get(id).ok_or_else(|| self.unknown(id))
    }

    /// Sub-container with exactly the given ids. Repeated ids select the
    /// image once.
    ///
    /// # Errors
    ///
    /// [`crate::Error::UnknownImage`] for the first id that is not in the container.
    pub fn select<S: AsRef<str>>(&self, ids: &[S]) -> crate::Result<Self> {
        let mut seen = BTreeSet::new();
        let images = ids
            .iter()
            .map(|id| id.as_ref())
            .filter(|id| seen.insert(*id))
            .map(|id| self.get(id).cloned())
            .collect::<crate::Result<Vec<_>>>()?;
        Ok(Self::new(images))
    }

    /// All ids, sorted.
    pub fn ids(&self) -> Vec<String> {
        self.images.keys().cloned().collect()
    }

    /// Keep images of kind `matching` (if given) that are not of kind
    /// `ignoring` (if given).
    pub fn filter(&self, matching: Option<ImageKind>, ignoring: Option<ImageKind>) -> Self {
        Self::new(
            self.iter()
                .filter(|image| matching.is_none_or(|kind| image.kind() == kind))
                .filter(|image| ignoring.is_none_or(|kind| image.kind() != kind))
                .cloned(),
        )
    }

    pub fn iter(&self) -> impl Iterator<Item = &Image> {
        self.images.values()
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    fn unknown(&self, id: &str) -> crate::Error {
        crate::Error::UnknownImage {
            id: id.to_owned(),
            known: self.ids(),
        }
    }
}

impl<'a> IntoIterator for &'a ImagesContainer {
    type Item = &'a Image;
    type IntoIter = std::collections::btree_map::Values<'a, String, Image>;

    fn into_iter(self) -> Self::IntoIter {
        self.images.values()
    }
}
