//! The static lamp scene: ground, lamp, lights, and ambient sparkles

use crate::primitives::{
    create_circle_mesh, create_cone_mesh, create_plane_mesh, create_sphere_mesh, create_torus_mesh,
};
use crate::scene_graph::{Fog, Light, Material, Node, PointCloud, SceneGraph};
use diya_core::{Color, NodeId, PointStyle, RandomSource, Transform, Vec3};

/// Lamp yaw speed in radians per second
const LAMP_YAW_RATE: f32 = 0.2;
/// Vertical bob amplitude and angular frequency
const LAMP_BOB_AMPLITUDE: f32 = 0.02;
const LAMP_BOB_FREQUENCY: f32 = 1.2;
/// Sparkle field yaw speed in radians per second
const SPARKLE_YAW_RATE: f32 = 0.02;

const SPARKLE_HEIGHT: f32 = 0.4;

/// Handles to the animated parts of the fixture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneFixture {
    pub ground: NodeId,
    pub lamp: NodeId,
    pub flame: NodeId,
    pub flame_light: NodeId,
    pub sparkles: NodeId,
}

impl SceneFixture {
    /// Populate `graph` with the lamp scene
    pub fn build(graph: &mut SceneGraph, sparkle_count: usize, rng: &mut dyn RandomSource) -> Self {
        graph.fog = Some(Fog {
            color: Color::from_hex(0x070617),
            density: 0.08,
        });

        graph.add(Node::light(
            "ambient",
            Light::Ambient {
                color: Color::WHITE,
                intensity: 0.15,
            },
        ));
        graph.add(Node::light(
            "hemisphere",
            Light::Hemisphere {
                sky: Color::from_hex(0xffeedd),
                ground: Color::from_hex(0x111122),
                intensity: 0.4,
            },
        ));

        let ground = graph.add(
            Node::mesh(
                "ground",
                create_plane_mesh(20.0, 20.0),
                Material::lit(Color::from_hex(0x05040a)),
            )
            .with_transform(Transform::from_position(Vec3::new(0.0, -0.8, 0.0))),
        );

        let lamp = graph.add(Node::group("lamp"));
        let (flame, flame_light) = build_lamp(graph, lamp);

        let sparkles = graph.add(
            Node::points(
                "sparkles",
                PointCloud::new(
                    scatter_sparkles(sparkle_count, rng),
                    PointStyle {
                        size: 0.04,
                        color: [1.0, 1.0, 1.0],
                        opacity: 0.9,
                    },
                ),
            )
            .with_transform(Transform::from_position(Vec3::new(0.0, SPARKLE_HEIGHT, 0.0))),
        );

        log::debug!("Scene fixture built with {} sparkles", sparkle_count);

        Self {
            ground,
            lamp,
            flame,
            flame_light,
            sparkles,
        }
    }

    /// Apply the idle animation for `elapsed` seconds since the scene started.
    ///
    /// A pure function of time: calling it twice with the same `elapsed` leaves
    /// the graph unchanged.
    pub fn animate(&self, graph: &mut SceneGraph, elapsed: f64) {
        let t = elapsed as f32;

        if let Some(lamp) = graph.get_mut(self.lamp) {
            lamp.transform.rotation.y = (t * LAMP_YAW_RATE).to_degrees();
            lamp.transform.position.y = (t * LAMP_BOB_FREQUENCY).sin() * LAMP_BOB_AMPLITUDE;
        }
        if let Some(sparkles) = graph.get_mut(self.sparkles) {
            sparkles.transform.rotation.y = (t * SPARKLE_YAW_RATE).to_degrees();
        }
    }
}

fn build_lamp(graph: &mut SceneGraph, lamp: NodeId) -> (NodeId, NodeId) {
    graph.add_child(
        lamp,
        Node::mesh(
            "bowl",
            create_torus_mesh(0.9, 0.25, 24, 80),
            Material::lit(Color::from_hex(0x5a2b16)),
        )
        .with_transform(
            Transform::IDENTITY
                .with_rotation(Vec3::new(90.0, 0.0, 0.0))
                .with_scale(Vec3::new(0.9, 0.9, 0.9)),
        ),
    );

    graph.add_child(
        lamp,
        Node::mesh(
            "oil",
            create_circle_mesh(0.6, 32),
            Material::lit(Color::from_hex(0x1a0f03)),
        )
        .with_transform(
            Transform::from_position(Vec3::new(0.0, 0.02, 0.0)).with_rotation(Vec3::new(-90.0, 0.0, 0.0)),
        ),
    );

    let flame_material = Material {
        color: Color::WHITE,
        emissive: Color::from_hex(0xff9f3b),
        emissive_intensity: 2.0,
        opacity: 0.95,
        unlit: false,
    };
    // Flipped so the tip points down into the oil
    let flame = graph
        .add_child(
            lamp,
            Node::mesh("flame", create_cone_mesh(0.18, 0.5, 16), flame_material).with_transform(
                Transform::from_position(Vec3::new(0.0, 0.35, 0.0)).with_rotation(Vec3::new(180.0, 0.0, 0.0)),
            ),
        )
        .unwrap_or(lamp);

    graph.add_child(
        lamp,
        Node::mesh(
            "core",
            create_sphere_mesh(0.06, 12, 8),
            Material::unlit(Color::from_hex(0xfff7d6)),
        )
        .with_transform(Transform::from_position(Vec3::new(0.0, 0.4, 0.0))),
    );

    let flame_light = graph
        .add_child(
            lamp,
            Node::light(
                "flame_light",
                Light::Point {
                    color: Color::from_hex(0xffb86b),
                    intensity: 1.8,
                    distance: 5.0,
                    decay: 2.0,
                },
            )
            .with_transform(Transform::from_position(Vec3::new(0.0, 0.4, 0.0))),
        )
        .unwrap_or(lamp);

    (flame, flame_light)
}

fn scatter_sparkles(count: usize, rng: &mut dyn RandomSource) -> Vec<Vec3> {
    (0..count)
        .map(|_| {
            Vec3::new(
                rng.range(-4.0, 4.0),
                rng.range(-0.5, 1.5),
                rng.range(-2.0, 2.0),
            )
        })
        .collect()
}
