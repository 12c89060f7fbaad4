//! Property sheet of the scene transition and its dynamic behavior.

use super::config::NO_FILTER_VALUE;
use crate::host::{SourceRef, SourceRegistry};
use crate::locale::text;
use crate::version::VersionInfo;
use scene_transition_types::properties::set_float_suffix;
use scene_transition_types::{keys, ComboFormat, ComboType, Properties, Settings};

/// Build the property sheet. `bridge` supplies the initial filter list.
pub fn build<H: SourceRegistry + ?Sized>(host: &H, bridge: Option<SourceRef>) -> Properties {
    let mut props = Properties::new();

    let scene = props.add_list(
        keys::SCENE,
        text("Scene"),
        ComboType::Editable,
        ComboFormat::String,
    );
    scene.long_description = Some(text("SceneDescription").to_string());
    for name in host.enum_scenes() {
        scene.list_add(&name, name.as_str());
    }
    scene.has_modified_callback = true;

    let p = props.add_float(keys::DURATION, text("Duration"), 0.0, 30000.0, 100.0);
    set_float_suffix(p, " ms");
    p.long_description = Some(text("DurationDescription").to_string());

    props.add_group(
        "transition_point_group",
        text("TransitionPointSettings"),
        transition_point_group(),
    );
    props.add_group("audio_group", text("AudioSettings"), audio_group());

    let filter = props.add_list(
        keys::FILTER,
        text("FilterToTrigger"),
        ComboType::Editable,
        ComboFormat::String,
    );
    filter.long_description = Some(text("FilterToTriggerDescription").to_string());
    filter.list_add(text("NoFilterSelected"), NO_FILTER_VALUE);
    if let Some(bridge) = bridge {
        for name in host.enum_filters(bridge) {
            filter.list_add(&name, name.as_str());
        }
    }

    props.add_info(
        "plugin_info",
        &format!(
            "{} ({})",
            text("SceneAsTransition"),
            VersionInfo::get().display_version()
        ),
    );

    props
}

fn transition_point_group() -> Properties {
    let mut group = Properties::new();

    let p = group.add_list(
        keys::TP_TYPE,
        text("TransitionPointType"),
        ComboType::List,
        ComboFormat::Int,
    );
    p.list_add(text("TransitionPointPercentage"), 0_i64);
    p.list_add(text("TransitionPointTime"), 1_i64);
    p.long_description = Some(text("TransitionPointTypeDescription").to_string());
    p.has_modified_callback = true;

    let p = group.add_float_slider(
        keys::TRANSITION_POINT,
        text("TransitionPoint"),
        0.0,
        100.0,
        1.0,
    );
    set_float_suffix(p, "%");
    p.long_description = Some(text("TransitionPointPercentageDescription").to_string());

    let p = group.add_float(
        keys::TRANSITION_POINT_MS,
        text("TransitionPoint"),
        0.0,
        30000.0,
        100.0,
    );
    set_float_suffix(p, " ms");
    p.long_description = Some(text("TransitionPointTimeDescription").to_string());

    group
}

fn audio_group() -> Properties {
    let mut group = Properties::new();

    let p = group.add_list(
        keys::AUDIO_FADE_STYLE,
        text("AudioFadeStyle"),
        ComboType::List,
        ComboFormat::Int,
    );
    p.long_description = Some(text("AudioFadeStyleDescription").to_string());
    p.list_add(text("FadeOutFadeIn"), 0_i64);
    p.list_add(text("CrossFade"), 1_i64);

    let p = group.add_float_slider(keys::AUDIO_VOLUME, text("AudioVolume"), 0.0, 100.0, 1.0);
    set_float_suffix(p, "%");
    p.long_description = Some(text("AudioVolumeDescription").to_string());

    group
}

/// Show the percentage or the millisecond field depending on `tp_type`.
pub fn transition_point_type_modified(props: &mut Properties, settings: &Settings) -> bool {
    let time_based = settings.get_int(keys::TP_TYPE) == 1;
    props.set_visible(keys::TRANSITION_POINT, !time_based);
    props.set_visible(keys::TRANSITION_POINT_MS, time_based);
    true
}

/// Repopulate the filter list when a different scene is chosen.
pub fn scene_modified<H: SourceRegistry + ?Sized>(
    host: &H,
    props: &mut Properties,
    settings: &mut Settings,
) -> bool {
    let scene_name = settings.get_string(keys::SCENE).to_string();
    if scene_name == settings.get_string(keys::PREV_SCENE) {
        return true;
    }

    let scene = host.get_source_by_name(&scene_name);
    if let Some(filter) = props.get_mut(keys::FILTER) {
        filter.list_clear();
        filter.list_add(text("NoFilterSelected"), NO_FILTER_VALUE);
        if let Some(scene) = scene {
            for name in host.enum_filters(scene) {
                filter.list_add(&name, name.as_str());
            }
        }
    }
    if let Some(scene) = scene {
        host.release(scene);
    }

    settings.set_string(keys::FILTER, text("NoFilterSelected"));
    settings.set_string(keys::PREV_SCENE, &scene_name);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimHost;
    use scene_transition_types::PropertyValue;

    fn filter_values(props: &Properties) -> Vec<PropertyValue> {
        props
            .get(keys::FILTER)
            .unwrap()
            .list_items()
            .iter()
            .map(|item| item.value.clone())
            .collect()
    }

    #[test]
    fn test_build_lists_scenes_and_filters() {
        let host = SimHost::new();
        host.add_scene("Intro");
        let stinger = host.add_scene("Stinger");
        host.add_filter("Stinger", "Shake");

        let props = build(&host, Some(stinger));

        let scenes: Vec<_> = props
            .get(keys::SCENE)
            .unwrap()
            .list_items()
            .iter()
            .map(|item| item.label.clone())
            .collect();
        assert_eq!(scenes, vec!["Intro", "Stinger"]);
        assert_eq!(
            filter_values(&props),
            vec![
                PropertyValue::from(NO_FILTER_VALUE),
                PropertyValue::from("Shake")
            ]
        );
        assert!(props.get(keys::TRANSITION_POINT_MS).is_some());
        assert!(props.get(keys::AUDIO_VOLUME).is_some());
        assert!(props.get("plugin_info").is_some());
    }

    #[test]
    fn test_transition_point_type_toggles_visibility() {
        let host = SimHost::new();
        let mut props = build(&host, None);
        let mut settings = Settings::new();

        settings.set_int(keys::TP_TYPE, 1);
        assert!(transition_point_type_modified(&mut props, &settings));
        assert!(!props.get(keys::TRANSITION_POINT).unwrap().visible);
        assert!(props.get(keys::TRANSITION_POINT_MS).unwrap().visible);

        settings.set_int(keys::TP_TYPE, 0);
        transition_point_type_modified(&mut props, &settings);
        assert!(props.get(keys::TRANSITION_POINT).unwrap().visible);
        assert!(!props.get(keys::TRANSITION_POINT_MS).unwrap().visible);
    }

    #[test]
    fn test_scene_modified_repopulates_filters() {
        let host = SimHost::new();
        host.add_scene("Stinger");
        host.add_filter("Stinger", "Shake");
        host.add_filter("Stinger", "Glow");

        let mut props = build(&host, None);
        let mut settings = Settings::new();
        settings.set_string(keys::SCENE, "Stinger");
        settings.set_string(keys::FILTER, "Old");

        assert!(scene_modified(&host, &mut props, &mut settings));
        assert_eq!(filter_values(&props).len(), 3);
        assert_eq!(settings.get_string(keys::FILTER), text("NoFilterSelected"));
        assert_eq!(settings.get_string(keys::PREV_SCENE), "Stinger");
        // The lookup reference is returned
        assert_eq!(host.ref_count_by_name("Stinger"), 0);
    }

    #[test]
    fn test_scene_modified_same_scene_keeps_filter() {
        let host = SimHost::new();
        host.add_scene("Stinger");
        let mut props = build(&host, None);
        let mut settings = Settings::new();
        settings.set_string(keys::SCENE, "Stinger");
        settings.set_string(keys::PREV_SCENE, "Stinger");
        settings.set_string(keys::FILTER, "Shake");

        scene_modified(&host, &mut props, &mut settings);
        assert_eq!(settings.get_string(keys::FILTER), "Shake");
    }
}
