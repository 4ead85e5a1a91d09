use crate::query::{ParameterDescriptor, QueryParameters, QueryValue, convert};

/// Query for `POST /images/create` (pull or import).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImagesCreateParameters {
    /// Image to pull, e.g. `alpine` or `registry.local/team/app`.
    pub from_image: Option<String>,
    /// Source to import from (`-` for the request body).
    pub from_src: Option<String>,
    /// Repository name when importing.
    pub repo: Option<String>,
    /// Tag or digest.
    pub tag: Option<String>,
    /// Platform in `os[/arch[/variant]]` form.
    pub platform: Option<String>,
    /// Dockerfile instructions applied while importing.
    pub changes: Vec<String>,
}

impl ImagesCreateParameters {
    /// Pull `image` at `tag`.
    #[must_use]
    pub fn pull(image: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            from_image: Some(image.into()),
            tag: Some(tag.into()),
            ..Self::default()
        }
    }
}

impl QueryParameters for ImagesCreateParameters {
    const DESCRIPTORS: &'static [ParameterDescriptor<Self>] = &[
        ParameterDescriptor::new("from_image", "fromImage", |p: &Self| {
            p.from_image.clone().map(QueryValue::Str)
        })
        .required(),
        ParameterDescriptor::new("from_src", "fromSrc", |p: &Self| {
            p.from_src.clone().map(QueryValue::Str)
        }),
        ParameterDescriptor::new("repo", "repo", |p: &Self| p.repo.clone().map(QueryValue::Str)),
        ParameterDescriptor::new("tag", "tag", |p: &Self| p.tag.clone().map(QueryValue::Str)),
        ParameterDescriptor::new("platform", "platform", |p: &Self| {
            p.platform.clone().map(QueryValue::Str)
        }),
        ParameterDescriptor::new("changes", "changes", |p: &Self| {
            Some(QueryValue::List(p.changes.clone()))
        })
        .with_converter(convert::LIST),
    ];
}

/// Query for `POST /images/{name}/push`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImagePushParameters {
    /// Tag to push; empty pushes every tag.
    pub tag: Option<String>,
    /// Platform of a single manifest to push.
    pub platform: Option<String>,
}

impl QueryParameters for ImagePushParameters {
    const DESCRIPTORS: &'static [ParameterDescriptor<Self>] = &[
        ParameterDescriptor::new("tag", "tag", |p: &Self| p.tag.clone().map(QueryValue::Str)),
        ParameterDescriptor::new("platform", "platform", |p: &Self| {
            p.platform.clone().map(QueryValue::Str)
        }),
    ];
}
