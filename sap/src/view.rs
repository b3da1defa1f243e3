// view.rs      View module
//
// Copyright (c) 2024-2025  Douglas Lau
//
use crate::mesh::{build_cloud, CloudBuilder};
use crate::stage::build_stage;
use bevy::{
    input::mouse::{MouseMotion, MouseWheel},
    prelude::*,
    window::{PrimaryWindow, Window},
};
use sapling::Tree;
use std::f32::consts::PI;

/// Tree model resource
#[derive(Resource)]
struct TreeRes {
    tree: Tree,
}

/// Camera controller component
#[derive(Component)]
struct CameraController {
    focus: Vec3,
    distance: f32,
}

/// Swaying point cloud (tree batch index)
#[derive(Component)]
struct Sway(usize);

/// Stage (box environment)
#[derive(Component)]
struct Stage;

impl CameraController {
    /// Create a new camera controller
    fn new(pos: Vec3, focus: Vec3) -> Self {
        CameraController {
            focus,
            distance: pos.distance(focus),
        }
    }

    /// Update camera transform
    fn update_transform(&self, xform: &mut Transform) {
        let rot = Mat3::from_quat(xform.rotation);
        xform.translation =
            self.focus + rot.mul_vec3(Vec3::new(0.0, 0.0, self.distance));
    }

    /// Pan camera
    fn pan(&mut self, xform: &mut Transform, motion: Vec2, win_sz: Vec2) {
        let proj = PerspectiveProjection::default();
        let pan =
            motion * Vec2::new(proj.fov * proj.aspect_ratio, proj.fov) / win_sz;
        let right = xform.rotation * Vec3::X * -pan.x;
        let up = xform.rotation * Vec3::Y * pan.y;
        let translation = (right + up) * self.distance;
        self.focus += translation;
        self.update_transform(xform);
    }

    /// Rotate camera
    fn rotate(&mut self, xform: &mut Transform, motion: Vec2, win_sz: Vec2) {
        let delta_x = motion.x / win_sz.x * PI;
        let delta_y = motion.y / win_sz.y * PI;
        xform.rotation = Quat::from_rotation_y(-delta_x * 2.0)
            * xform.rotation
            * Quat::from_rotation_x(-delta_y);
        self.update_transform(xform);
    }

    /// Move camera forward / reverse
    fn forward_reverse(&mut self, xform: &mut Transform, motion: f32) {
        let pos = xform.translation;
        let rot = Mat3::from_quat(xform.rotation);
        let dist = self.distance + motion * self.distance * 0.1;
        self.focus = pos - rot.mul_vec3(Vec3::new(0.0, 0.0, dist));
        self.update_transform(xform);
    }

    /// Zoom camera in or out
    fn zoom(&mut self, xform: &mut Transform, motion: f32) {
        if motion < 0.0 {
            self.distance -= motion * self.distance.max(1.0) * 0.1;
        } else {
            self.distance -= motion * self.distance * 0.1;
        }
        self.update_transform(xform);
    }
}

/// View a tree model in an app window
pub fn view_tree(tree: Tree) {
    App::new()
        .insert_resource(TreeRes { tree })
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "sap".to_string(),
                ..default()
            }),
            ..default()
        }))
        .add_systems(Startup, (spawn_clouds, spawn_camera))
        .add_systems(
            Update,
            (
                sway_tree,
                pan_rotate_camera,
                zoom_camera,
                toggle_stage,
                toggle_help,
            ),
        )
        .run();
}

/// Get the bounds of a tree as bevy vectors
fn tree_bounds(tree: &Tree) -> (Vec3, Vec3) {
    let (min, max) = tree.bounds();
    (Vec3::from_array(min.to_array()), Vec3::from_array(max.to_array()))
}

/// System to spawn tree and stage point clouds
fn spawn_clouds(
    mut commands: Commands,
    tree_res: Res<TreeRes>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let material = materials.add(StandardMaterial {
        unlit: true,
        ..Default::default()
    });
    let mut builder = CloudBuilder::default();
    tree_res.tree.draw(&mut builder);
    for (i, mesh) in builder.take_meshes().into_iter().enumerate() {
        commands.spawn((
            Sway(i),
            MaterialMeshBundle {
                mesh: meshes.add(mesh),
                material: material.clone(),
                ..Default::default()
            },
        ));
    }
    let (min, max) = tree_bounds(&tree_res.tree);
    let size =
        2.5 * (max.x - min.x).max(max.y - min.y).max(max.z - min.z);
    let stage = build_stage(size, &mut fastrand::Rng::new());
    commands.spawn((
        Stage,
        MaterialMeshBundle {
            mesh: meshes.add(build_cloud(&stage)),
            material,
            visibility: Visibility::Hidden,
            ..Default::default()
        },
    ));
}

/// System to spawn camera
fn spawn_camera(mut commands: Commands, tree_res: Res<TreeRes>) {
    let (min, max) = tree_bounds(&tree_res.tree);
    let look = (min + max) / 2.0;
    let half = (max - min) / 2.0;
    let pos = look + Vec3::new(0.0, 2.0 * half.y, 4.0 * half.z.max(half.x));
    let id = commands
        .spawn((
            Camera3dBundle {
                transform: Transform::from_translation(pos)
                    .looking_at(look, Vec3::Y),
                ..Default::default()
            },
            CameraController::new(pos, look),
        ))
        .id();
    spawn_help(&mut commands, id);
}

/// System to spawn help text
fn spawn_help(commands: &mut Commands, camera_id: Entity) {
    commands.spawn((
        TargetCamera(camera_id),
        TextBundle::from_section(
            "_____ Mouse _____\n\
             right: pan camera\n\
             middle: rotate camera\n\
             wheel: zoom camera\n\
             \n\
             _____ Keys _____\n\
             'Q': toggle help text\n\
             'S': toggle stage",
            TextStyle {
                font_size: 18.0,
                ..default()
            },
        )
        .with_style(Style {
            position_type: PositionType::Absolute,
            top: Val::Px(12.0),
            right: Val::Px(12.0),
            ..default()
        }),
    ));
}

/// System to sway the tree point clouds
fn sway_tree(
    time: Res<Time>,
    mut tree_res: ResMut<TreeRes>,
    mut meshes: ResMut<Assets<Mesh>>,
    query: Query<(&Handle<Mesh>, &Sway)>,
) {
    tree_res.tree.animate(time.elapsed_seconds());
    for (handle, sway) in &query {
        if let (Some(mesh), Some(batch)) =
            (meshes.get_mut(handle), tree_res.tree.batches().nth(sway.0))
        {
            let pos: Vec<[f32; 3]> =
                batch.positions().iter().map(|p| p.to_array()).collect();
            mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, pos);
        }
    }
}

/// System to pan/rotate the camera
fn pan_rotate_camera(
    windows: Query<&Window, With<PrimaryWindow>>,
    mouse: Res<ButtonInput<MouseButton>>,
    mut ev_motion: EventReader<MouseMotion>,
    mut query: Query<(&mut CameraController, &mut Transform)>,
) {
    if !mouse.pressed(MouseButton::Right) && !mouse.pressed(MouseButton::Middle)
    {
        ev_motion.clear();
        return;
    }
    let mut motion = Vec2::ZERO;
    for ev in ev_motion.read() {
        motion += ev.delta;
    }
    if motion.length_squared() > 0.0 {
        let win_sz = primary_window_size(windows);
        if let Ok((mut cam, mut xform)) = query.get_single_mut() {
            if mouse.pressed(MouseButton::Right) {
                cam.pan(&mut xform, motion, win_sz);
            } else {
                cam.rotate(&mut xform, motion, win_sz);
            }
        }
    }
}

/// Get the size of the primary window
fn primary_window_size(windows: Query<&Window, With<PrimaryWindow>>) -> Vec2 {
    let window = windows.get_single().unwrap();
    Vec2::new(window.width(), window.height())
}

/// System to zoom the camera
fn zoom_camera(
    mouse: Res<ButtonInput<MouseButton>>,
    mut ev_scroll: EventReader<MouseWheel>,
    mut query: Query<(&mut CameraController, &mut Transform)>,
) {
    let mut motion = 0.0;
    for ev in ev_scroll.read() {
        motion += ev.y;
    }
    if motion.abs() > 0.0 {
        if let Ok((mut cam, mut xform)) = query.get_single_mut() {
            if mouse.pressed(MouseButton::Middle) {
                cam.forward_reverse(&mut xform, motion);
            } else {
                cam.zoom(&mut xform, motion);
            }
        }
    }
}

/// System to toggle stage
fn toggle_stage(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut query: Query<&mut Visibility, With<Stage>>,
) {
    if keyboard.just_pressed(KeyCode::KeyS) {
        let mut vis = query.single_mut();
        *vis = if *vis == Visibility::Hidden {
            Visibility::Visible
        } else {
            Visibility::Hidden
        };
    }
}

/// System to toggle help text
fn toggle_help(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut query: Query<&mut Visibility, With<Text>>,
) {
    if keyboard.just_pressed(KeyCode::KeyQ) {
        for mut vis in &mut query {
            *vis = if *vis == Visibility::Hidden {
                Visibility::Visible
            } else {
                Visibility::Hidden
            };
        }
    }
}
