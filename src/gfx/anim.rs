//! Keyframe sampling and the animation mixer for the skinned model.

use glam::{Mat4, Quat, Vec3};

use crate::assets::{AnimClip, SkinnedMeshCPU, TrackQuat, TrackVec3};

fn sample_vec3(track: &TrackVec3, t: f32, default: Vec3) -> Vec3 {
    let (times, vals) = (&track.times, &track.values);
    if times.is_empty() {
        return default;
    }
    if t <= times[0] {
        return vals[0];
    }
    if t >= *times.last().unwrap_or(&0.0) {
        return *vals.last().unwrap_or(&default);
    }
    let idx = times.partition_point(|&k| k <= t).saturating_sub(1);
    let (t0, t1) = (times[idx], times[idx + 1]);
    let f = ((t - t0) / (t1 - t0)).clamp(0.0, 1.0);
    vals[idx].lerp(vals[idx + 1], f)
}

fn sample_quat(track: &TrackQuat, t: f32, default: Quat) -> Quat {
    let (times, vals) = (&track.times, &track.values);
    if times.is_empty() {
        return default;
    }
    if t <= times[0] {
        return vals[0];
    }
    if t >= *times.last().unwrap_or(&0.0) {
        return *vals.last().unwrap_or(&default);
    }
    let idx = times.partition_point(|&k| k <= t).saturating_sub(1);
    let (t0, t1) = (times[idx], times[idx + 1]);
    let f = ((t - t0) / (t1 - t0)).clamp(0.0, 1.0);
    vals[idx].slerp(vals[idx + 1], f)
}

fn local_of(mesh: &SkinnedMeshCPU, clip: &AnimClip, node: usize, t: f32) -> Mat4 {
    let tr = clip
        .t_tracks
        .get(&node)
        .map(|tr| sample_vec3(tr, t, mesh.base_t[node]))
        .unwrap_or(mesh.base_t[node]);
    let rot = clip
        .r_tracks
        .get(&node)
        .map(|tr| sample_quat(tr, t, mesh.base_r[node]))
        .unwrap_or(mesh.base_r[node]);
    let sc = clip
        .s_tracks
        .get(&node)
        .map(|tr| sample_vec3(tr, t, mesh.base_s[node]))
        .unwrap_or(mesh.base_s[node]);
    Mat4::from_scale_rotation_translation(sc, rot, tr)
}

fn global_of(
    mesh: &SkinnedMeshCPU,
    clip: &AnimClip,
    node: usize,
    t: f32,
    cache: &mut [Option<Mat4>],
) -> Mat4 {
    if let Some(m) = cache[node] {
        return m;
    }
    let local = local_of(mesh, clip, node, t);
    let global = match mesh.parent[node] {
        Some(p) => global_of(mesh, clip, p, t, cache) * local,
        None => local,
    };
    cache[node] = Some(global);
    global
}

/// Sample the joint palette (global joint transform times inverse bind) at
/// clip time `t` seconds.
pub fn sample_palette(mesh: &SkinnedMeshCPU, clip: &AnimClip, t: f32) -> Vec<Mat4> {
    let mut cache = vec![None; mesh.parent.len()];
    mesh.joints_nodes
        .iter()
        .zip(mesh.inverse_bind.iter())
        .map(|(&node, inv)| global_of(mesh, clip, node, t, &mut cache) * *inv)
        .collect()
}

/// Plays one clip on a loop, stretched or squeezed to a chosen wall-clock
/// duration.
pub struct AnimationMixer {
    clip_duration: f32,
    play_duration: f32,
    time: f32, // seconds into the current loop, in play time
}

impl AnimationMixer {
    pub fn new(clip_duration: f32, play_duration: f32) -> Self {
        Self {
            clip_duration: clip_duration.max(1e-3),
            play_duration: play_duration.max(1e-3),
            time: 0.0,
        }
    }

    /// Advance by `dt` seconds of wall clock, wrapping at the loop boundary.
    pub fn update(&mut self, dt: f32) {
        self.time = (self.time + dt).rem_euclid(self.play_duration);
    }

    /// Change how long one loop takes; playback restarts from the beginning.
    pub fn set_duration(&mut self, play_duration: f32) {
        self.play_duration = play_duration.max(1e-3);
        self.time = 0.0;
    }

    /// Current position mapped into clip time.
    pub fn clip_time(&self) -> f32 {
        self.time / self.play_duration * self.clip_duration
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn clip_with_t_track(times: Vec<f32>, values: Vec<Vec3>) -> AnimClip {
        let mut t_tracks = HashMap::new();
        let duration = times.last().copied().unwrap_or(0.0);
        t_tracks.insert(0usize, TrackVec3 { times, values });
        AnimClip {
            name: "test".into(),
            duration,
            t_tracks,
            r_tracks: HashMap::new(),
            s_tracks: HashMap::new(),
        }
    }

    fn one_joint_mesh() -> SkinnedMeshCPU {
        SkinnedMeshCPU {
            vertices: Vec::new(),
            indices: Vec::new(),
            joints_nodes: vec![0],
            inverse_bind: vec![Mat4::IDENTITY],
            parent: vec![None],
            base_t: vec![Vec3::ZERO],
            base_r: vec![Quat::IDENTITY],
            base_s: vec![Vec3::ONE],
            animations: Vec::new(),
            base_color_texture: None,
        }
    }

    #[test]
    fn palette_interpolates_translation() {
        let mesh = one_joint_mesh();
        let clip = clip_with_t_track(
            vec![0.0, 2.0],
            vec![Vec3::ZERO, Vec3::new(4.0, 0.0, 0.0)],
        );
        let pal = sample_palette(&mesh, &clip, 1.0);
        let p = pal[0].transform_point3(Vec3::ZERO);
        assert!((p.x - 2.0).abs() < 1e-5, "got {p:?}");
    }

    #[test]
    fn palette_clamps_outside_the_track() {
        let mesh = one_joint_mesh();
        let clip = clip_with_t_track(
            vec![0.5, 1.0],
            vec![Vec3::new(1.0, 0.0, 0.0), Vec3::new(2.0, 0.0, 0.0)],
        );
        let before = sample_palette(&mesh, &clip, 0.0)[0].transform_point3(Vec3::ZERO);
        let after = sample_palette(&mesh, &clip, 9.0)[0].transform_point3(Vec3::ZERO);
        assert!((before.x - 1.0).abs() < 1e-5);
        assert!((after.x - 2.0).abs() < 1e-5);
    }

    #[test]
    fn child_inherits_parent_transform() {
        let mut mesh = one_joint_mesh();
        mesh.joints_nodes = vec![1];
        mesh.inverse_bind = vec![Mat4::IDENTITY];
        mesh.parent = vec![None, Some(0)];
        mesh.base_t = vec![Vec3::new(0.0, 3.0, 0.0), Vec3::new(1.0, 0.0, 0.0)];
        mesh.base_r = vec![Quat::IDENTITY; 2];
        mesh.base_s = vec![Vec3::ONE; 2];
        let clip = AnimClip {
            name: "idle".into(),
            duration: 1.0,
            t_tracks: HashMap::new(),
            r_tracks: HashMap::new(),
            s_tracks: HashMap::new(),
        };
        let p = sample_palette(&mesh, &clip, 0.0)[0].transform_point3(Vec3::ZERO);
        assert!((p - Vec3::new(1.0, 3.0, 0.0)).length() < 1e-5, "got {p:?}");
    }

    #[test]
    fn mixer_wraps_at_the_loop_boundary() {
        let mut mx = AnimationMixer::new(2.0, 10.0);
        mx.update(9.0);
        mx.update(3.0);
        assert!((mx.clip_time() - 2.0 / 10.0 * 2.0).abs() < 1e-5);
    }

    #[test]
    fn mixer_scales_clip_time_by_duration() {
        let mut mx = AnimationMixer::new(2.0, 10.0);
        mx.update(5.0); // halfway through the loop
        assert!((mx.clip_time() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn set_duration_restarts_playback() {
        let mut mx = AnimationMixer::new(2.0, 10.0);
        mx.update(7.0);
        mx.set_duration(4.0);
        assert_eq!(mx.clip_time(), 0.0);
        mx.update(1.0);
        assert!((mx.clip_time() - 0.5).abs() < 1e-5);
    }
}
