//! Mount service
//!
//! Loads a component manifest and mirrors it onto a scene graph:
//! every declaration is registered in order, then the tree is flushed once.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult, Manifest};
use crate::config::Settings;
use crate::domain::{DomainError, FlushReport, Object3D, TreeBuilder};
use crate::infrastructure::traits::FileSystem;

/// Result of mounting a manifest.
#[derive(Debug)]
pub struct MountedScene {
    /// Builder after flush; holds the node tree
    pub builder: TreeBuilder<Object3D>,
    /// Scene object of the root; the mirrored object tree hangs off it
    pub scene: Object3D,
    pub report: FlushReport,
    /// Identifiers rejected at registration because they were already taken
    pub rejected: Vec<String>,
}

impl MountedScene {
    /// True when every declaration was registered and attached.
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty() && self.report.is_clean()
    }
}

/// Service that turns manifests into mounted scenes.
pub struct MountService {
    fs: Arc<dyn FileSystem>,
    settings: Arc<Settings>,
}

impl MountService {
    pub fn new(fs: Arc<dyn FileSystem>, settings: Arc<Settings>) -> Self {
        Self { fs, settings }
    }

    /// Read and parse a manifest file.
    #[instrument(level = "debug", skip(self))]
    pub fn load(&self, path: &Path) -> ApplicationResult<Manifest> {
        if !self.fs.is_file(path) {
            return Err(ApplicationError::OperationFailed {
                context: format!("manifest not found: {}", path.display()),
                source: Box::new(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "file does not exist",
                )),
            });
        }
        let content =
            self.fs
                .read_to_string(path)
                .map_err(|e| ApplicationError::OperationFailed {
                    context: format!("read manifest: {}", path.display()),
                    source: Box::new(e),
                })?;
        Manifest::parse(&content, path)
    }

    /// Register every declaration in manifest order, then flush once.
    ///
    /// Duplicate identifiers are collected in [`MountedScene::rejected`];
    /// any other domain error aborts the mount.
    #[instrument(level = "debug", skip(self, manifest))]
    pub fn mount(&self, manifest: &Manifest) -> ApplicationResult<MountedScene> {
        let scene = Object3D::new(self.settings.root_id.as_str());
        let mut builder =
            TreeBuilder::with_root_object(self.settings.root_id.as_str(), Some(scene.clone()));
        let mut rejected = Vec::new();

        for decl in &manifest.nodes {
            let object = match (&decl.object, self.settings.implicit_objects) {
                (Some(name), _) => Some(Object3D::new(name.as_str())),
                (None, true) => Some(Object3D::new(decl.id.as_str())),
                (None, false) => None,
            };
            match builder.register(&decl.id, object, decl.parent.as_deref()) {
                Ok(_) => {}
                Err(DomainError::DuplicateIdentifier(id)) => rejected.push(id),
                Err(e) => return Err(e.into()),
            }
        }
        debug!("registered {} of {} declarations", builder.registered(), manifest.nodes.len());

        let report = builder.flush();
        Ok(MountedScene {
            builder,
            scene,
            report,
            rejected,
        })
    }

    /// Load a manifest file and mount it.
    pub fn mount_file(&self, path: &Path) -> ApplicationResult<MountedScene> {
        let manifest = self.load(path)?;
        self.mount(&manifest)
    }
}
