//! End-to-end frames against a headless device. These need a working GPU,
//! so they only run with the `integration-tests` feature enabled.

#[cfg(feature = "integration-tests")]
mod gpu {
    use ember_ngin::context::Context;
    use ember_ngin::data_structures::{Object, Scene, Texture, scene::unit_quad_mesh};
    use ember_ngin::render::{Renderer, RendererDesc};
    use ember_ngin::surface::{OffscreenSurface, RenderSurface};
    use ember_ngin::{Matrix4, SquareMatrix, Vector3};

    // Unit quad, untextured default material (albedo (1,1,1)), first
    // transform the identity.
    fn quad_scene(transform_count: usize) -> Scene {
        let mut scene = Scene::new();
        let mesh = scene.meshes.push(unit_quad_mesh());
        let material = scene.add_material();

        let stage = scene.current_stage_mut();
        let object = stage.add_object();
        *stage.objects.get_mut(object) = Object {
            mesh,
            material,
            mesh_lod: Vec::new(),
        };
        let group = stage.add_instance_group();
        let group = stage.instances.get_mut(group);
        group.object = object;
        group.transforms.push(Matrix4::identity());
        for i in 1..transform_count {
            group
                .transforms
                .push(Matrix4::from_translation(Vector3::new(
                    i as f32, -1.0, -3.0,
                )));
        }
        stage.cam_pos = Vector3::new(0.0, 1.0, 2.0);
        stage.cam_dir = Vector3::new(0.0, -0.5, -1.0);
        scene
    }

    fn mk_renderer(width: u32, height: u32) -> Renderer {
        let _ = env_logger::builder().is_test(true).try_init();
        let ctx = pollster::block_on(Context::headless(width, height)).unwrap();
        Renderer::new(ctx, RendererDesc::default())
    }

    #[test]
    fn frame_runs_the_fixed_pass_sequence_without_a_sky() {
        let mut renderer = mk_renderer(64, 64);
        let scene = quad_scene(1);
        let mut surface = OffscreenSurface::new(64, 64);

        renderer.upload(&scene);
        renderer.render(&scene, &mut surface).unwrap();

        let stats = renderer.last_frame_stats();
        assert_eq!(stats.composite_passes, 1);
        assert_eq!(stats.downsample_passes, 5);
        assert_eq!(stats.upsample_passes, 4);
        assert_eq!(stats.draw_calls, 1);
        let (scene_input, bloom_input) = stats.composite_inputs.unwrap();
        assert_ne!(scene_input, bloom_input, "composite must read two slots");
        // First frame configures both HDR attachments, depth and all mips.
        assert_eq!(stats.slots_reconfigured, 8);
        assert!(!surface.resized(), "renderer must clear the flag");
    }

    #[test]
    fn steady_state_frames_reuse_every_screen_resource() {
        let mut renderer = mk_renderer(64, 64);
        let scene = quad_scene(1);
        let mut surface = OffscreenSurface::new(64, 64);

        renderer.render(&scene, &mut surface).unwrap();
        renderer.render(&scene, &mut surface).unwrap();

        let stats = renderer.last_frame_stats();
        assert_eq!(stats.slots_reconfigured, 0);
        assert_eq!(stats.composite_passes, 1);
    }

    #[test]
    fn resize_reallocates_the_whole_slot_set_once() {
        let mut renderer = mk_renderer(64, 64);
        let scene = quad_scene(1);
        let mut surface = OffscreenSurface::new(64, 64);

        renderer.render(&scene, &mut surface).unwrap();
        surface.set_size(128, 96);
        renderer.render(&scene, &mut surface).unwrap();

        assert_eq!(renderer.last_frame_stats().slots_reconfigured, 8);
        assert_eq!(renderer.context().extent(), (128, 96));

        renderer.render(&scene, &mut surface).unwrap();
        assert_eq!(renderer.last_frame_stats().slots_reconfigured, 0);
    }

    #[test]
    fn each_transform_in_a_group_costs_one_draw() {
        let mut renderer = mk_renderer(64, 64);
        let scene = quad_scene(3);
        let mut surface = OffscreenSurface::new(64, 64);

        renderer.render(&scene, &mut surface).unwrap();
        assert_eq!(renderer.last_frame_stats().draw_calls, 3);
    }

    #[test]
    fn degenerate_entities_draw_harmlessly() {
        let mut renderer = mk_renderer(64, 64);
        let mut scene = quad_scene(1);

        // A default-constructed mesh behind a valid handle, paired with a
        // zero-extent texture behind a Some albedo handle.
        let empty_mesh = scene.add_mesh();
        let empty_texture = scene.add_texture(Texture::default());
        let material = scene.add_material();
        scene.materials.get_mut(material).albedo_texture = Some(empty_texture);

        let stage = scene.current_stage_mut();
        let object = stage.add_object();
        *stage.objects.get_mut(object) = Object {
            mesh: empty_mesh,
            material,
            mesh_lod: Vec::new(),
        };
        let group = stage.add_instance_group();
        let group = stage.instances.get_mut(group);
        group.object = object;
        group.transforms.push(Matrix4::identity());

        let mut surface = OffscreenSurface::new(64, 64);
        renderer.render(&scene, &mut surface).unwrap();

        // The quad plus one zero-index draw for the empty mesh.
        assert_eq!(renderer.last_frame_stats().draw_calls, 2);
        assert_eq!(renderer.last_frame_stats().composite_passes, 1);
    }

    #[test]
    fn zero_extent_surface_skips_the_frame() {
        let mut renderer = mk_renderer(64, 64);
        let scene = quad_scene(1);
        let mut surface = OffscreenSurface::new(0, 0);

        renderer.render(&scene, &mut surface).unwrap();
        assert_eq!(renderer.last_frame_stats(), Default::default());
        assert!(surface.resized(), "a skipped frame must not clear the flag");
    }
}
