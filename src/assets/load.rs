//! Background model loading with in-process completion messages.
//!
//! Each glTF bundle loads on its own thread and reports over an unbounded
//! `std::sync::mpsc` channel; the frame loop drains completions without
//! blocking, so a model may pop into the scene on a later frame. Load
//! failures are logged and produce no message — the object is simply absent.
//! There is no cancellation of in-flight loads.

use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::JoinHandle;

use crate::assets::{load_gltf_mesh, load_gltf_skinned, CpuMesh, SkinnedMeshCPU};

/// Which static model a completion belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModelKind {
    House,
    Alien,
    Cat,
}

pub enum LoadedAsset {
    Static { kind: ModelKind, mesh: CpuMesh },
    Skinned { mesh: Box<SkinnedMeshCPU> },
}

#[derive(Clone)]
pub struct Tx(Sender<LoadedAsset>);
pub struct Rx(Receiver<LoadedAsset>);

/// Create a sender/receiver pair. The underlying channel is unbounded.
#[must_use]
pub fn channel() -> (Tx, Rx) {
    let (s, r) = mpsc::channel();
    (Tx(s), Rx(r))
}

impl Rx {
    /// Non-blocking receive of a single completion.
    pub fn try_recv(&self) -> Option<LoadedAsset> {
        self.0.try_recv().ok()
    }

    /// Drain all currently queued completions.
    pub fn drain(&self) -> Vec<LoadedAsset> {
        let mut out = Vec::new();
        while let Some(a) = self.try_recv() {
            out.push(a);
        }
        out
    }
}

/// Load a static model on a background thread.
pub fn spawn_static(tx: &Tx, kind: ModelKind, path: PathBuf) -> JoinHandle<()> {
    let tx = tx.0.clone();
    std::thread::spawn(move || match load_gltf_mesh(&path) {
        Ok(mesh) => {
            log::info!("loaded {:?}: {} ({} verts)", kind, path.display(), mesh.vertices.len());
            let _ = tx.send(LoadedAsset::Static { kind, mesh });
        }
        Err(e) => log::error!("{:?} load failed: {e:#}", kind),
    })
}

/// Load the skinned model on a background thread.
pub fn spawn_skinned(tx: &Tx, path: PathBuf) -> JoinHandle<()> {
    let tx = tx.0.clone();
    std::thread::spawn(move || match load_gltf_skinned(&path) {
        Ok(mesh) => {
            log::info!(
                "loaded skinned model: {} ({} joints, {} clips)",
                path.display(),
                mesh.joints_nodes.len(),
                mesh.animations.len()
            );
            let _ = tx.send(LoadedAsset::Skinned { mesh: Box::new(mesh) });
        }
        Err(e) => log::error!("skinned model load failed: {e:#}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_load_sends_nothing_and_does_not_panic() {
        let (tx, rx) = channel();
        let h = spawn_static(&tx, ModelKind::Cat, PathBuf::from("assets/models/nope.gltf"));
        assert!(h.join().is_ok(), "loader thread must not panic");
        assert!(rx.drain().is_empty());
    }

    #[test]
    fn drain_is_nonblocking_when_empty() {
        let (_tx, rx) = channel();
        assert!(rx.try_recv().is_none());
        assert!(rx.drain().is_empty());
    }
}
