//! Attribute-based artifact transforms: user-registered units that convert an artifact file
//! from one declared format to another.

use crate::attributes::AttributeContainer;
use crate::error::ConfigurationError;
use std::fmt::Debug;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A user-supplied conversion from one artifact file to another. `transform` performs the
/// conversion as a side effect; `result` looks up the produced file for a specific requested
/// output container (a transform may produce more than one output format per declared
/// registration, see [`TransformRegistry::register`]).
pub trait Transform: Debug + Send + Sync {
    /// What this transform consumes, e.g. `{extension=aar}`.
    fn input_attributes(&self) -> AttributeContainer;

    /// Every format this transform can produce, e.g. `[{format=JAR}]`.
    fn output_attributes(&self) -> Vec<AttributeContainer>;

    fn transform(&self, input: &Path) -> Result<(), String>;

    /// The file produced for a specific requested output container, once `transform` has run.
    fn result(&self, requested: &AttributeContainer) -> Option<PathBuf>;

    fn display_name(&self) -> String {
        format!("{:?}", self)
    }
}

/// One row generated at registration time: a transform fanned out against one of its declared
/// output-attribute sets.
struct Registration {
    transform: Arc<dyn Transform>,
    from: AttributeContainer,
    to: AttributeContainer,
}

/// Holds every registered transform, fanned out one row per declared output-attribute set at
/// registration time.
#[derive(Default)]
pub struct TransformRegistry {
    registrations: Vec<Registration>,
}

impl TransformRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Instantiates the transform, reads its attribute declarations, and generates one
    /// registration row per declared output-attribute set. Rows share one `Arc` of the
    /// transform so a single registration with several output formats only runs it once.
    pub fn register(&mut self, transform: Box<dyn Transform>) {
        let transform: Arc<dyn Transform> = Arc::from(transform);
        let from = transform.input_attributes();
        for to in transform.output_attributes() {
            self.registrations.push(Registration {
                transform: transform.clone(),
                from: from.clone(),
                to,
            });
        }
    }

    /// `getTransform(from, to)`: the first registration whose `from`/`to` are each satisfied by
    /// the query (every attribute in the registration must have an equal value in the query;
    /// extra attributes in the query are allowed). Returns a callable that runs the transform
    /// and looks up its result, or `None` if no registration matches.
    pub fn get_transform<'a>(
        &'a self,
        from: &'a AttributeContainer,
        to: &'a AttributeContainer,
    ) -> Option<TransformCall<'a>> {
        self.registrations
            .iter()
            .find(|r| from.satisfies(&r.from) && to.satisfies(&r.to))
            .map(|r| TransformCall {
                transform: r.transform.as_ref(),
                to: to.clone(),
            })
    }
}

/// The callable `getTransform` returns: input file in, output file out, with the execution
/// contract from §4.5.
pub struct TransformCall<'a> {
    transform: &'a dyn Transform,
    to: AttributeContainer,
}

impl<'a> TransformCall<'a> {
    pub fn invoke(&self, input: &Path, output_dir: Option<&Path>) -> Result<PathBuf, ConfigurationError> {
        if let Some(dir) = output_dir {
            std::fs::create_dir_all(dir).map_err(|e| ConfigurationError::TransformFailure {
                transform: self.transform.display_name(),
                input: input.to_path_buf(),
                cause: e.to_string(),
            })?;
        }

        self.transform
            .transform(input)
            .map_err(|cause| ConfigurationError::TransformFailure {
                transform: self.transform.display_name(),
                input: input.to_path_buf(),
                cause,
            })?;

        match self.transform.result(&self.to) {
            Some(output) if output.exists() => Ok(output),
            Some(output) => Err(ConfigurationError::TransformFailure {
                transform: self.transform.display_name(),
                input: input.to_path_buf(),
                cause: format!("expected output file {:?} was not created", output),
            }),
            None => Err(ConfigurationError::TransformFailure {
                transform: self.transform.display_name(),
                input: input.to_path_buf(),
                cause: "no output file created".to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::Attribute;
    use std::sync::Mutex;

    #[derive(Debug)]
    struct AarToJar {
        ran: Mutex<bool>,
        output: PathBuf,
    }

    impl Transform for AarToJar {
        fn input_attributes(&self) -> AttributeContainer {
            let mut attrs = AttributeContainer::new();
            attrs
                .put(&Attribute::<String>::of("extension"), "aar".to_string())
                .unwrap();
            attrs
        }

        fn output_attributes(&self) -> Vec<AttributeContainer> {
            let mut attrs = AttributeContainer::new();
            attrs
                .put(&Attribute::<String>::of("format"), "JAR".to_string())
                .unwrap();
            vec![attrs]
        }

        fn transform(&self, _input: &Path) -> Result<(), String> {
            *self.ran.lock().unwrap() = true;
            std::fs::write(&self.output, b"jar bytes").map_err(|e| e.to_string())
        }

        fn result(&self, _requested: &AttributeContainer) -> Option<PathBuf> {
            Some(self.output.clone())
        }
    }

    #[test]
    fn matching_ignores_extra_attributes_on_query_side() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.jar");
        let mut registry = TransformRegistry::new();
        registry.register(Box::new(AarToJar {
            ran: Mutex::new(false),
            output: output.clone(),
        }));

        let mut from = AttributeContainer::new();
        from.put(&Attribute::<String>::of("extension"), "aar".to_string())
            .unwrap();
        from.put(&Attribute::<String>::of("extra"), "ignored".to_string())
            .unwrap();
        let mut to = AttributeContainer::new();
        to.put(&Attribute::<String>::of("format"), "JAR".to_string())
            .unwrap();

        let call = registry.get_transform(&from, &to).unwrap();
        let result = call.invoke(Path::new("/tmp/in.aar"), None).unwrap();
        assert_eq!(result, output);
    }

    #[test]
    fn no_match_returns_none() {
        let registry = TransformRegistry::new();
        let empty = AttributeContainer::new();
        assert!(registry.get_transform(&empty, &empty).is_none());
    }
}
