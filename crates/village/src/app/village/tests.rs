    use super::*;
    use super::hud::floor_nav_buttons;
    use super::status_source::StatusSource;
    use super::test_support::{sample_layout, SAMPLE_LAYOUT_JSON};
    use engine::Drawable;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::fs;

    const POLL_SECONDS: f32 = 0.25;
    const TICK_SECONDS: f32 = 1.0 / 60.0;

    struct ScriptedSource {
        responses: VecDeque<Result<StatusDocument, StatusError>>,
    }

    impl StatusSource for ScriptedSource {
        fn fetch(&mut self) -> Result<StatusDocument, StatusError> {
            self.responses
                .pop_front()
                .unwrap_or(Err(StatusError::HttpStatus { status: 503 }))
        }

        fn describe(&self) -> String {
            "scripted".to_string()
        }
    }

    fn status_ok(value: serde_json::Value) -> Result<StatusDocument, StatusError> {
        Ok(StatusDocument::parse(&value.to_string()).expect("status document"))
    }

    fn loaded_scene(
        responses: Option<Vec<Result<StatusDocument, StatusError>>>,
    ) -> (VillageScene, SceneWorld) {
        let poller = responses.map(|responses| {
            let source = ScriptedSource {
                responses: responses.into(),
            };
            StatusPoller::new(
                POLL_SECONDS,
                Box::new(InlineStatusChannel::new(Box::new(source))),
            )
        });
        let mut scene = VillageScene::new(PathBuf::from("unused.json"), sample_layout(), poller);
        let mut world = SceneWorld::default();
        scene.load(&mut world);
        (scene, world)
    }

    fn settle(scene: &mut VillageScene, world: &mut SceneWorld) {
        for _ in 0..60 {
            scene.update(TICK_SECONDS, &InputSnapshot::empty(), world);
        }
    }

    fn click_at(point: Vec2) -> InputSnapshot {
        InputSnapshot::empty()
            .with_left_click_pressed(true)
            .with_cursor_position_px(Some(point))
    }

    fn region_for(scene: &VillageScene, world: &SceneWorld, wanted: &HitAction) -> ScreenRect {
        let id = scene
            .actions
            .iter()
            .find(|(_, action)| *action == wanted)
            .map(|(id, _)| *id)
            .expect("hit action registered");
        world.hit_region(id).expect("hit region").rect
    }

    fn floor_index(scene: &VillageScene, key: &str) -> usize {
        scene.layout.floor_index(key).expect("floor")
    }

    #[test]
    fn load_places_avatar_at_start_location() {
        let (scene, world) = loaded_scene(None);

        assert_eq!(scene.active_floor, floor_index(&scene, "ground"));
        assert_eq!(scene.avatar.current_location_key(), "desk");
        assert!(!scene.avatar.is_transitioning());
        assert_eq!(scene.panel.floor_name(), "Ground floor");
        assert_eq!(scene.panel.location_name(), "Desk");
        assert_eq!(scene.panel.activity(), "Writing code");
        assert_eq!(world.layer_count(), 5);
        assert!(!world.layer_by_name("hud").expect("hud").drawables.is_empty());
        assert_eq!(
            scene.debug_title(&world).as_deref(),
            Some("Pixel Village - Ground floor - Desk")
        );
    }

    #[test]
    fn clicking_a_location_updates_panel_then_arrives() {
        let (mut scene, mut world) = loaded_scene(None);
        let meeting = region_for(&scene, &world, &HitAction::MoveTo("meeting".to_string()));

        let command = scene.update(TICK_SECONDS, &click_at(meeting.center()), &mut world);

        assert_eq!(command, SceneCommand::None);
        assert_eq!(scene.panel.location_name(), "Meeting room");
        assert_eq!(scene.panel.activity(), "In a meeting");
        assert!(scene.avatar.is_transitioning());
        assert_eq!(scene.avatar.current_location_key(), "desk");

        settle(&mut scene, &mut world);

        assert_eq!(scene.avatar.current_location_key(), "meeting");
        assert!(!scene.avatar.is_transitioning());
    }

    #[test]
    fn clicks_during_a_move_are_dropped() {
        let (mut scene, mut world) = loaded_scene(None);
        let meeting = region_for(&scene, &world, &HitAction::MoveTo("meeting".to_string()));
        let desk = region_for(&scene, &world, &HitAction::MoveTo("desk".to_string()));

        scene.update(TICK_SECONDS, &click_at(meeting.center()), &mut world);
        scene.update(TICK_SECONDS, &click_at(desk.center()), &mut world);

        assert_eq!(scene.avatar.target_key(), Some("meeting"));
        assert_eq!(scene.panel.location_name(), "Meeting room");

        settle(&mut scene, &mut world);
        assert_eq!(scene.avatar.current_location_key(), "meeting");
    }

    #[test]
    fn unknown_status_location_only_changes_activity() {
        let (mut scene, mut world) = loaded_scene(Some(vec![status_ok(
            json!({"location": "nonexistent", "activity": "Testing"}),
        )]));

        scene.update(POLL_SECONDS, &InputSnapshot::empty(), &mut world);

        assert_eq!(scene.avatar.current_location_key(), "desk");
        assert!(!scene.avatar.is_transitioning());
        assert_eq!(scene.panel.activity(), "Testing");
        assert_eq!(scene.active_floor, floor_index(&scene, "ground"));
    }

    #[test]
    fn failed_fetches_leave_scene_untouched() {
        let (mut scene, mut world) = loaded_scene(Some(vec![
            Err(StatusError::HttpStatus { status: 500 }),
            Err(StatusError::WorkerStopped),
        ]));
        let before = scene.avatar.state().clone();

        for _ in 0..4 {
            assert_eq!(
                scene.update(POLL_SECONDS, &InputSnapshot::empty(), &mut world),
                SceneCommand::None
            );
        }

        assert_eq!(scene.avatar.state(), &before);
        assert_eq!(scene.panel.location_name(), "Desk");
        assert_eq!(scene.panel.activity(), "Writing code");
    }

    #[test]
    fn status_floor_switch_rebuilds_and_discards_stale_regions() {
        let (mut scene, mut world) = loaded_scene(Some(vec![status_ok(
            json!({"floor": "village", "building": "shop", "activity": "Buying bread"}),
        )]));
        let stale: Vec<HitRegionId> = scene.actions.keys().copied().collect();

        scene.update(POLL_SECONDS, &InputSnapshot::empty(), &mut world);

        assert_eq!(scene.active_floor, floor_index(&scene, "village"));
        assert_eq!(scene.avatar.current_location_key(), "home");
        assert_eq!(scene.avatar.target_key(), Some("shop"));
        assert_eq!(scene.panel.floor_name(), "Village");
        assert_eq!(scene.panel.location_name(), "Shop");
        assert_eq!(scene.panel.activity(), "Buying bread");
        for id in &stale {
            assert!(world.hit_region(*id).is_none());
            assert!(!scene.actions.contains_key(id));
        }
        assert_eq!(scene.actions.len(), world.hit_region_count());

        settle(&mut scene, &mut world);
        assert_eq!(scene.avatar.current_location_key(), "shop");
    }

    #[test]
    fn page_keys_step_floors_and_stop_at_edges() {
        let (mut scene, mut world) = loaded_scene(None);
        let next = InputSnapshot::empty().with_action_pressed(InputAction::NextFloor);
        let previous = InputSnapshot::empty().with_action_pressed(InputAction::PreviousFloor);
        let last = scene.layout.floor_count() - 1;

        scene.update(TICK_SECONDS, &next, &mut world);
        assert_eq!(scene.active_floor, last);
        assert_eq!(scene.avatar.current_location_key(), "home");
        scene.update(TICK_SECONDS, &next, &mut world);
        assert_eq!(scene.active_floor, last);

        scene.update(TICK_SECONDS, &previous, &mut world);
        scene.update(TICK_SECONDS, &previous, &mut world);
        assert_eq!(scene.active_floor, 0);
        assert_eq!(scene.avatar.current_location_key(), "storage");
        assert_eq!(scene.panel.floor_name(), "Basement");
        scene.update(TICK_SECONDS, &previous, &mut world);
        assert_eq!(scene.active_floor, 0);
    }

    #[test]
    fn hud_floor_button_switches_floor() {
        let (mut scene, mut world) = loaded_scene(None);
        let basement = floor_index(&scene, "basement");
        let (_, button) = floor_nav_buttons(&scene.layout, hud_strip())
            .into_iter()
            .find(|(index, _)| *index == basement)
            .expect("basement button");

        scene.update(TICK_SECONDS, &click_at(button.center()), &mut world);

        assert_eq!(scene.active_floor, basement);
        assert_eq!(scene.avatar.current_location_key(), "storage");
        assert!(!scene.avatar.is_transitioning());
    }

    #[test]
    fn avatar_layer_tracks_draw_position() {
        let (mut scene, mut world) = loaded_scene(None);
        settle(&mut scene, &mut world);
        let avatar = world.layer_by_name("avatar").expect("avatar layer");

        match avatar.drawables.first() {
            Some(Drawable::Circle { center, .. }) => {
                assert_eq!(*center, scene.avatar.draw_position())
            }
            other => panic!("expected avatar glow, got {other:?}"),
        }
    }

    #[test]
    fn reload_reads_layout_from_disk_and_keeps_it_on_failure() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("village.json");
        fs::write(&path, SAMPLE_LAYOUT_JSON).expect("write layout");
        let layout = load_layout(&path).expect("layout");
        let mut scene = VillageScene::new(path.clone(), layout, None);
        let mut world = SceneWorld::default();
        scene.load(&mut world);
        let reload = InputSnapshot::empty().with_action_pressed(InputAction::Reload);

        fs::write(&path, SAMPLE_LAYOUT_JSON.replace("Ground floor", "Lobby"))
            .expect("rewrite layout");
        assert_eq!(
            scene.update(TICK_SECONDS, &reload, &mut world),
            SceneCommand::HardReset
        );
        scene.unload(&mut world);
        world.clear();
        scene.load(&mut world);
        assert_eq!(scene.panel.floor_name(), "Lobby");
        assert_eq!(scene.avatar.current_location_key(), "desk");

        fs::write(&path, "{ \"floors\": ").expect("break layout");
        assert_eq!(
            scene.update(TICK_SECONDS, &reload, &mut world),
            SceneCommand::None
        );
        assert_eq!(scene.panel.floor_name(), "Lobby");
        assert_eq!(scene.layout.floor_count(), 3);
    }
