//! Scene to render buffer.

use glam::Vec2;

use crate::components::node::{Node, Visual};
use crate::core::scene::Scene;
use crate::renderer::instance::{RenderBuffer, RenderInstance};
use crate::systems::effects::{ray_fan_triangles, rect_triangles};

/// Build the render buffer from every visible node in the scene.
/// Nodes are emitted in ascending z order; equal z keeps spawn-slot order.
/// Sprites become instances, ray fans and overlays become shape triangles,
/// groups contribute nothing.
pub fn build_render_buffer(scene: &Scene, buffer: &mut RenderBuffer) {
    buffer.clear();

    let mut nodes: Vec<&Node> = scene
        .iter()
        .map(|(_, node)| node)
        .filter(|node| node.visible && node.alpha > 0.0)
        .collect();
    nodes.sort_by_key(|node| node.z_index);

    for node in nodes {
        let [r, g, b] = node.tint.to_rgb();
        match node.visual {
            Visual::Group => {}
            Visual::Sprite(texture) => buffer.push(RenderInstance::new(
                node.pos.x,
                node.pos.y,
                node.rotation,
                node.scale.to_array(),
                node.alpha,
                [r, g, b],
                texture as u32 as f32,
                node.z_index as f32,
            )),
            Visual::RayFan { rays, length, half_width, fill_alpha } => ray_fan_triangles(
                node.pos,
                node.rotation,
                node.scale,
                rays,
                length,
                half_width,
                [r, g, b, fill_alpha * node.alpha],
                &mut buffer.shapes,
            ),
            Visual::Overlay { width, height } => rect_triangles(
                node.pos,
                Vec2::new(width, height) * node.scale,
                [r, g, b, node.alpha],
                &mut buffer.shapes,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::textures::TextureId;
    use crate::components::color::Color;

    #[test]
    fn sprites_become_instances_in_z_order() {
        let mut scene = Scene::new();
        scene.spawn(
            Node::sprite(TextureId::Coin)
                .with_pos(Vec2::new(10.0, 20.0))
                .with_z_index(5),
        );
        scene.spawn(
            Node::sprite(TextureId::Sparkle)
                .with_pos(Vec2::new(30.0, 40.0))
                .with_tint(Color(0xff0000))
                .with_z_index(1),
        );

        let mut buffer = RenderBuffer::new();
        build_render_buffer(&scene, &mut buffer);

        assert_eq!(buffer.instance_count(), 2);
        let first = buffer.instances[0];
        assert_eq!((first.x, first.y), (30.0, 40.0));
        assert_eq!((first.r, first.g, first.b), (1.0, 0.0, 0.0));
        assert_eq!(first.texture, TextureId::Sparkle as u32 as f32);
        assert_eq!(buffer.instances[1].z, 5.0);
        assert_eq!(buffer.shape_vertex_count(), 0);
    }

    #[test]
    fn hidden_and_transparent_nodes_are_skipped() {
        let mut scene = Scene::new();
        let mut hidden = Node::sprite(TextureId::Coin);
        hidden.visible = false;
        scene.spawn(hidden);
        scene.spawn(Node::sprite(TextureId::Coin).with_alpha(0.0));
        scene.spawn(Node::group());

        let mut buffer = RenderBuffer::new();
        build_render_buffer(&scene, &mut buffer);
        assert_eq!(buffer.instance_count(), 0);
        assert_eq!(buffer.shape_vertex_count(), 0);
    }

    #[test]
    fn shapes_carry_fill_and_node_alpha() {
        let mut scene = Scene::new();
        scene.spawn(
            Node::new(Visual::RayFan { rays: 4, length: 100.0, half_width: 5.0, fill_alpha: 0.5 })
                .with_alpha(0.5),
        );
        scene.spawn(Node::new(Visual::Overlay { width: 800.0, height: 600.0 }).with_alpha(0.25));

        let mut buffer = RenderBuffer::new();
        build_render_buffer(&scene, &mut buffer);
        assert_eq!(buffer.shape_vertex_count(), 4 * 3 + 6);
        assert_eq!(buffer.shapes[0].a, 0.25);
        assert_eq!(buffer.shapes[12].a, 0.25);
        assert_eq!(buffer.shapes[14].x, 800.0);
        assert_eq!(buffer.shapes[14].y, 600.0);
    }
}
