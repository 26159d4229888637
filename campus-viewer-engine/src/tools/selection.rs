use bevy::prelude::*;
use bevy::render::primitives::Aabb;
use bevy::window::PrimaryWindow;
use constants::camera::INITIAL_FOCUS_DIRECTION;

use crate::engine::assets::building_registry::BuildingRegistry;
use crate::engine::assets::info_record::InfoRecord;
use crate::engine::assets::role_map::RoleConfig;
use crate::engine::camera::navigator::{FlyTarget, FlyToEvent};
use crate::engine::loading::progress::LoadingProgress;
use crate::engine::render::schedule::RenderSchedule;
use crate::engine::scene::bounds::WorldBounds;
use crate::tools::picker::PickEvent;

#[cfg(not(target_arch = "wasm32"))]
use bevy::tasks::{AsyncComputeTaskPool, Task, futures_lite::future};

/// Interaction state of the viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionPhase {
    #[default]
    Idle,
    GroupSelected,
    /// A single mesh outside every building group is selected.
    PartSelected,
}

/// The one active selection. Replaced wholesale on every pick.
///
/// `generation` counts picks (and dismissals); asynchronous lookups remember
/// the generation they were issued under and only the matching one may touch
/// the popup, so out-of-order responses can never resurrect an abandoned
/// selection.
#[derive(Resource, Debug, Default)]
pub struct SelectionState {
    pub phase: SelectionPhase,
    /// Group id, or the raw node identifier for ungrouped hits.
    pub selected_id: Option<String>,
    pub generation: u64,
}

impl SelectionState {
    /// Open a new interaction generation, invalidating pending lookups.
    pub fn begin_pick(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    pub fn clear(&mut self) {
        self.phase = SelectionPhase::Idle;
        self.selected_id = None;
    }
}

/// Where a popup's fly-to action goes.
#[derive(Debug, Clone)]
pub enum FlyRef {
    None,
    Group(String),
    /// Ungrouped node: no registry entry exists, so the popup carries the
    /// node's own bounds for later fly-to use.
    Part {
        entity: Entity,
        center: Vec3,
        radius: f32,
    },
}

/// Popup payload, tagged by how the selection resolved.
#[derive(Debug, Clone)]
pub enum PopupContent {
    /// Group with no mapped role: local metadata only, no backend call.
    Group {
        id: String,
        name: String,
        department: Option<String>,
        description: Option<String>,
        part_count: usize,
    },
    /// Ungrouped node with no mapped role.
    Part {
        id: String,
        name: String,
        department: Option<String>,
        description: Option<String>,
    },
    /// Resolved through the info backend (or its static fallback).
    Role {
        role: String,
        title: String,
        department: String,
        body: String,
        media: Vec<String>,
        events: Option<String>,
        entry_count: usize,
    },
}

/// The dismissible info popup. One at most; cleared on empty-space picks.
#[derive(Debug, Clone)]
pub struct Popup {
    pub content: PopupContent,
    /// Screen position of the originating pick.
    pub origin: Vec2,
    pub fly: FlyRef,
}

impl Popup {
    /// Common display projection over the three content variants.
    pub fn title(&self) -> &str {
        match &self.content {
            PopupContent::Group { name, .. } | PopupContent::Part { name, .. } => name,
            PopupContent::Role { title, .. } => title,
        }
    }

    pub fn department(&self) -> Option<&str> {
        match &self.content {
            PopupContent::Group { department, .. } | PopupContent::Part { department, .. } => {
                department.as_deref()
            }
            PopupContent::Role { department, .. } => Some(department),
        }
    }

    pub fn body(&self) -> Option<&str> {
        match &self.content {
            PopupContent::Group { description, .. } | PopupContent::Part { description, .. } => {
                description.as_deref()
            }
            PopupContent::Role { body, .. } => Some(body),
        }
    }

    pub fn part_count(&self) -> usize {
        match &self.content {
            PopupContent::Group { part_count, .. } => *part_count,
            PopupContent::Part { .. } => 1,
            PopupContent::Role { entry_count, .. } => *entry_count,
        }
    }

    /// JSON projection streamed to the embedding frontend.
    pub fn to_notification(&self) -> serde_json::Value {
        let kind = match &self.content {
            PopupContent::Group { .. } => "group",
            PopupContent::Part { .. } => "part",
            PopupContent::Role { .. } => "role",
        };
        let (media, events) = match &self.content {
            PopupContent::Role { media, events, .. } => (media.clone(), events.clone()),
            _ => (Vec::new(), None),
        };
        serde_json::json!({
            "visible": true,
            "kind": kind,
            "title": self.title(),
            "department": self.department(),
            "body": self.body(),
            "parts": self.part_count(),
            "media": media,
            "events": events,
            "origin": { "x": self.origin.x, "y": self.origin.y },
        })
    }
}

#[derive(Resource, Debug, Default)]
pub struct ActivePopup(pub Option<Popup>);

/// User closed the popup. Selection returns to idle; the camera stays put.
#[derive(Event, Debug, Clone, Copy)]
pub struct DismissPopup;

/// Everything a lookup needs to build its popup once it resolves, minus the
/// transport itself.
#[derive(Debug, Clone)]
pub struct LookupContext {
    pub generation: u64,
    pub role: String,
    pub origin: Vec2,
    /// Display name of the originating group, when one exists.
    pub group_name: Option<String>,
    pub fly: FlyRef,
}

/// In-flight backend lookup. At most one; a newer pick leaves the request
/// running but its completion fails the generation check and is dropped.
#[cfg(not(target_arch = "wasm32"))]
pub struct LookupRequest {
    pub context: LookupContext,
    pub task: Task<Result<Vec<InfoRecord>, crate::lookup::LookupError>>,
}

#[cfg(not(target_arch = "wasm32"))]
#[derive(Resource, Default)]
pub struct PendingLookup(pub Option<LookupRequest>);

/// Fold a finished (or failed) lookup into the popup.
///
/// Returns false without touching anything when the request's generation no
/// longer matches the live selection. On failure the curated role profile is
/// the fallback, then a generic message; the error never propagates further.
pub fn apply_lookup_result(
    context: &LookupContext,
    result: Result<Vec<InfoRecord>, String>,
    config: Option<&RoleConfig>,
    selection: &SelectionState,
    popup: &mut ActivePopup,
) -> bool {
    if context.generation != selection.generation {
        debug!(
            "Discarding stale info lookup for role '{}' (generation {} superseded)",
            context.role, context.generation
        );
        return false;
    }

    let role = &context.role;
    let content = match result {
        Ok(records) if records.is_empty() => PopupContent::Role {
            role: role.clone(),
            title: context
                .group_name
                .clone()
                .unwrap_or_else(|| role.to_uppercase()),
            department: role.to_uppercase(),
            body: "No data has been posted for this building yet.".to_string(),
            media: Vec::new(),
            events: None,
            entry_count: 0,
        },
        Ok(records) => {
            // latest entry first, per backend ordering
            let latest = &records[0];
            PopupContent::Role {
                role: role.clone(),
                title: latest
                    .name
                    .clone()
                    .or_else(|| context.group_name.clone())
                    .unwrap_or_else(|| role.to_uppercase()),
                department: role.to_uppercase(),
                body: latest.information.clone(),
                media: latest.picture.clone().into_iter().collect(),
                events: latest.happenings.clone(),
                entry_count: records.len(),
            }
        }
        Err(message) => {
            warn!("Error fetching info for role '{role}': {message}");
            let profile = config.and_then(|c| c.profile(role));
            PopupContent::Role {
                role: role.clone(),
                title: profile
                    .map(|p| p.display_name.clone())
                    .or_else(|| context.group_name.clone())
                    .unwrap_or_else(|| role.to_uppercase()),
                department: role.to_uppercase(),
                body: profile
                    .and_then(|p| p.description.clone())
                    .unwrap_or_else(|| {
                        "Unable to fetch dynamic info (server error).".to_string()
                    }),
                media: Vec::new(),
                events: None,
                entry_count: 0,
            }
        }
    };

    popup.0 = Some(Popup {
        content,
        origin: context.origin,
        fly: context.fly.clone(),
    });
    true
}

/// Drive the selection state machine from pick results.
///
/// Empty pick → idle. Grouped hit → role resolution (group id, then node id)
/// and either a backend lookup or a local-metadata popup. Ungrouped hit →
/// the same branching against the node id alone, keeping the node's bounds
/// around for fly-to.
pub fn handle_picks(
    mut picks: EventReader<PickEvent>,
    registry: Res<BuildingRegistry>,
    names: Query<&Name>,
    bounds_query: Query<(&Aabb, &GlobalTransform)>,
    config: Option<Res<RoleConfig>>,
    mut selection: ResMut<SelectionState>,
    mut popup: ResMut<ActivePopup>,
    time: Res<Time<Real>>,
    mut schedule: ResMut<RenderSchedule>,
    #[cfg(not(target_arch = "wasm32"))] client: Option<Res<crate::lookup::InfoClient>>,
    #[cfg(not(target_arch = "wasm32"))] mut pending: ResMut<PendingLookup>,
) {
    for pick in picks.read() {
        let generation = selection.begin_pick();

        let Some(hit) = &pick.hit else {
            // clicked empty space: close popup and selection
            selection.clear();
            popup.0 = None;
            schedule.request(time.elapsed_secs_f64());
            continue;
        };

        let node_name = names.get(hit.entity).ok().map(|n| n.as_str().to_string());
        let node_id = node_name
            .clone()
            .unwrap_or_else(|| format!("{:?}", hit.entity));

        if let Some(group) = registry.group_of(hit.entity) {
            selection.phase = SelectionPhase::GroupSelected;
            selection.selected_id = Some(group.id.clone());
            let fly = FlyRef::Group(group.id.clone());

            let role = config
                .as_deref()
                .and_then(|c| c.resolve_group_role(&group.id, &node_id));
            if let Some(role) = role {
                let context = LookupContext {
                    generation,
                    role: role.to_string(),
                    origin: pick.screen,
                    group_name: Some(group.display_name.clone()),
                    fly,
                };
                #[cfg(not(target_arch = "wasm32"))]
                dispatch_lookup(
                    context,
                    config.as_deref(),
                    &selection,
                    &mut popup,
                    client.as_deref(),
                    &mut pending,
                );
                #[cfg(target_arch = "wasm32")]
                dispatch_lookup(context, config.as_deref(), &selection, &mut popup);
            } else {
                // no role mapped: group metadata popup, no backend call
                let profile = config.as_deref().and_then(|c| c.profile(&group.id));
                popup.0 = Some(Popup {
                    content: PopupContent::Group {
                        id: group.id.clone(),
                        name: profile
                            .map(|p| p.display_name.clone())
                            .unwrap_or_else(|| group.display_name.clone()),
                        department: profile.and_then(|p| p.department.clone()),
                        description: profile.and_then(|p| p.description.clone()),
                        part_count: group.members.len(),
                    },
                    origin: pick.screen,
                    fly,
                });
            }
        } else {
            // hit a mesh outside every group
            let bounds = bounds_query
                .get(hit.entity)
                .map(|(aabb, transform)| WorldBounds::from_local_aabb(aabb, transform))
                .unwrap_or(WorldBounds {
                    min: hit.point,
                    max: hit.point,
                });
            let mut radius = bounds.sphere_radius();
            if radius <= 0.0 {
                radius = bounds.size().max_element() * 0.5;
            }
            if radius <= 0.0 {
                radius = 1.0;
            }
            let fly = FlyRef::Part {
                entity: hit.entity,
                center: bounds.center(),
                radius,
            };

            selection.phase = SelectionPhase::PartSelected;
            selection.selected_id = Some(node_id.clone());

            let role = config.as_deref().and_then(|c| c.resolve_node_role(&node_id));
            if let Some(role) = role {
                let context = LookupContext {
                    generation,
                    role: role.to_string(),
                    origin: pick.screen,
                    group_name: None,
                    fly,
                };
                #[cfg(not(target_arch = "wasm32"))]
                dispatch_lookup(
                    context,
                    config.as_deref(),
                    &selection,
                    &mut popup,
                    client.as_deref(),
                    &mut pending,
                );
                #[cfg(target_arch = "wasm32")]
                dispatch_lookup(context, config.as_deref(), &selection, &mut popup);
            } else {
                let profile = config.as_deref().and_then(|c| c.profile(&node_id));
                popup.0 = Some(Popup {
                    content: PopupContent::Part {
                        id: node_id,
                        name: profile
                            .map(|p| p.display_name.clone())
                            .or(node_name)
                            .unwrap_or_else(|| "Part".to_string()),
                        department: profile.and_then(|p| p.department.clone()),
                        description: profile.and_then(|p| p.description.clone()),
                    },
                    origin: pick.screen,
                    fly,
                });
            }
        }

        schedule.request(time.elapsed_secs_f64());
    }
}

/// Hand a role lookup to the backend: spawn an async task and park it in
/// [`PendingLookup`]. Without a client the static fallback applies at once.
#[cfg(not(target_arch = "wasm32"))]
fn dispatch_lookup(
    context: LookupContext,
    config: Option<&RoleConfig>,
    selection: &SelectionState,
    popup: &mut ActivePopup,
    client: Option<&crate::lookup::InfoClient>,
    pending: &mut PendingLookup,
) {
    if let Some(client) = client {
        let client = client.clone();
        let role = context.role.clone();
        let task = AsyncComputeTaskPool::get().spawn(async move { client.fetch_role_info(&role) });
        pending.0 = Some(LookupRequest { context, task });
        return;
    }
    let _ = apply_lookup_result(
        &context,
        Err("info backend unavailable".to_string()),
        config,
        selection,
        popup,
    );
}

/// On the web the embedding page owns dynamic data; role picks resolve to
/// the curated fallback immediately.
#[cfg(target_arch = "wasm32")]
fn dispatch_lookup(
    context: LookupContext,
    config: Option<&RoleConfig>,
    selection: &SelectionState,
    popup: &mut ActivePopup,
) {
    let _ = apply_lookup_result(
        &context,
        Err("dynamic info is fetched by the embedding page".to_string()),
        config,
        selection,
        popup,
    );
}

/// Poll the in-flight lookup and fold its result into the popup. The result
/// of a superseded request is discarded here; the HTTP request itself was
/// never aborted, only its effect is suppressed.
#[cfg(not(target_arch = "wasm32"))]
pub fn poll_pending_lookup(
    mut pending: ResMut<PendingLookup>,
    config: Option<Res<RoleConfig>>,
    selection: Res<SelectionState>,
    mut popup: ResMut<ActivePopup>,
    time: Res<Time<Real>>,
    mut schedule: ResMut<RenderSchedule>,
) {
    let finished = {
        let Some(request) = pending.0.as_mut() else {
            return;
        };
        future::block_on(future::poll_once(&mut request.task))
    };
    let Some(result) = finished else {
        return;
    };
    let Some(request) = pending.0.take() else {
        return;
    };

    let applied = apply_lookup_result(
        &request.context,
        result.map_err(|err| err.to_string()),
        config.as_deref(),
        &selection,
        &mut popup,
    );
    if applied {
        schedule.request(time.elapsed_secs_f64());
    }
}

/// Explicit popup dismissal: back to idle from any state, camera untouched.
/// Opens a new generation so a lookup still in flight cannot reopen the
/// popup afterwards.
pub fn handle_dismiss(
    mut events: EventReader<DismissPopup>,
    mut selection: ResMut<SelectionState>,
    mut popup: ResMut<ActivePopup>,
    time: Res<Time<Real>>,
    mut schedule: ResMut<RenderSchedule>,
) {
    if events.read().next().is_none() {
        return;
    }
    let _ = selection.begin_pick();
    selection.clear();
    popup.0 = None;
    schedule.request(time.elapsed_secs_f64());
}

/// Once running with the registry built, select and frame the configured
/// initial group (if any): popup mid-screen, camera snapped along the fixed
/// reveal direction, no animation.
pub fn apply_initial_focus(
    mut progress: ResMut<LoadingProgress>,
    config: Option<Res<RoleConfig>>,
    registry: Res<BuildingRegistry>,
    windows: Query<&Window, With<PrimaryWindow>>,
    mut selection: ResMut<SelectionState>,
    mut popup: ResMut<ActivePopup>,
    mut fly: EventWriter<FlyToEvent>,
) {
    if progress.initial_focus_done {
        return;
    }
    let Some(config) = config else {
        if progress.role_config_done {
            // config failed to load: nothing to focus
            progress.initial_focus_done = true;
        }
        return;
    };
    let Some(initial_id) = &config.initial_focus else {
        progress.initial_focus_done = true;
        return;
    };
    let Some(group) = registry.get(initial_id) else {
        progress.initial_focus_done = true;
        return;
    };

    let _ = selection.begin_pick();
    selection.phase = SelectionPhase::GroupSelected;
    selection.selected_id = Some(group.id.clone());

    let origin = windows
        .single()
        .map(|w| Vec2::new(w.width() * 0.5, w.height() * 0.5))
        .unwrap_or(Vec2::ZERO);
    popup.0 = Some(Popup {
        content: PopupContent::Group {
            id: group.id.clone(),
            name: group.display_name.clone(),
            department: None,
            description: None,
            part_count: group.members.len(),
        },
        origin,
        fly: FlyRef::Group(group.id.clone()),
    });

    fly.write(FlyToEvent {
        target: FlyTarget::group(group),
        animate: false,
        frames: 0,
        direction: Some(INITIAL_FOCUS_DIRECTION),
    });
    progress.initial_focus_done = true;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::assets::building_registry::BuildingGroup;

    #[cfg(not(target_arch = "wasm32"))]
    fn pick_app() -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .init_resource::<BuildingRegistry>()
            .init_resource::<SelectionState>()
            .init_resource::<ActivePopup>()
            .init_resource::<RenderSchedule>()
            .init_resource::<PendingLookup>()
            .add_event::<PickEvent>()
            .add_systems(Update, handle_picks);
        app
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn empty_pick_idles_the_selection_and_clears_the_popup() {
        let mut app = pick_app();
        {
            let mut selection = app.world_mut().resource_mut::<SelectionState>();
            selection.phase = SelectionPhase::GroupSelected;
            selection.selected_id = Some("Hall-A".to_string());
        }
        app.world_mut().resource_mut::<ActivePopup>().0 = Some(Popup {
            content: PopupContent::Part {
                id: "old".to_string(),
                name: "old".to_string(),
                department: None,
                description: None,
            },
            origin: Vec2::ZERO,
            fly: FlyRef::None,
        });

        app.world_mut().send_event(PickEvent {
            hit: None,
            screen: Vec2::new(10.0, 20.0),
        });
        app.update();

        let selection = app.world().resource::<SelectionState>();
        assert_eq!(selection.phase, SelectionPhase::Idle);
        assert!(selection.selected_id.is_none());
        assert!(app.world().resource::<ActivePopup>().0.is_none());
        // the settled empty state still gets its frame
        assert!(app.world().resource::<RenderSchedule>().has_pending());
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn grouped_pick_without_a_role_opens_a_metadata_popup() {
        let mut app = pick_app();
        let mesh = app
            .world_mut()
            .spawn(Name::new("Hall-A-wing"))
            .id();
        app.world_mut()
            .insert_resource(BuildingRegistry::from_groups(vec![BuildingGroup {
                id: "Hall-A".to_string(),
                display_name: "Hall-A".to_string(),
                members: vec![mesh],
                center_world: Vec3::ZERO,
                bounding_radius: 3.0,
                vertical_offset: 2.0,
            }]));

        app.world_mut().send_event(PickEvent {
            hit: Some(crate::tools::picker::PickHit {
                entity: mesh,
                distance: 12.0,
                point: Vec3::ZERO,
            }),
            screen: Vec2::new(200.0, 150.0),
        });
        app.update();

        let selection = app.world().resource::<SelectionState>();
        assert_eq!(selection.phase, SelectionPhase::GroupSelected);
        assert_eq!(selection.selected_id.as_deref(), Some("Hall-A"));

        let popup = app.world().resource::<ActivePopup>();
        let popup = popup.0.as_ref().unwrap();
        assert_eq!(popup.title(), "Hall-A");
        assert_eq!(popup.part_count(), 1);
        assert!(matches!(popup.fly, FlyRef::Group(_)));
    }

    fn context(generation: u64, role: &str) -> LookupContext {
        LookupContext {
            generation,
            role: role.to_string(),
            origin: Vec2::new(100.0, 80.0),
            group_name: Some("IT Building".to_string()),
            fly: FlyRef::Group("3DGeom-1078".to_string()),
        }
    }

    fn record(name: Option<&str>, information: &str) -> InfoRecord {
        InfoRecord {
            name: name.map(str::to_string),
            information: information.to_string(),
            picture: Some("uploads/it.jpg".to_string()),
            happenings: Some("Enrolment week".to_string()),
        }
    }

    #[test]
    fn stale_lookup_never_touches_the_popup() {
        let mut selection = SelectionState::default();
        let request_generation = selection.begin_pick();
        // a second pick supersedes the first before its lookup resolves
        let _ = selection.begin_pick();

        let mut popup = ActivePopup(Some(Popup {
            content: PopupContent::Part {
                id: "later-pick".to_string(),
                name: "later-pick".to_string(),
                department: None,
                description: None,
            },
            origin: Vec2::ZERO,
            fly: FlyRef::None,
        }));

        let applied = apply_lookup_result(
            &context(request_generation, "bsit"),
            Ok(vec![record(Some("Old"), "outdated")]),
            None,
            &selection,
            &mut popup,
        );

        assert!(!applied);
        let current = popup.0.as_ref().unwrap();
        assert_eq!(current.title(), "later-pick");
    }

    #[test]
    fn matching_lookup_shows_the_latest_record() {
        let mut selection = SelectionState::default();
        let generation = selection.begin_pick();
        let mut popup = ActivePopup::default();

        let applied = apply_lookup_result(
            &context(generation, "bsit"),
            Ok(vec![
                record(Some("IT Week Update"), "new labs open"),
                record(Some("Stale"), "old news"),
            ]),
            None,
            &selection,
            &mut popup,
        );

        assert!(applied);
        let current = popup.0.as_ref().unwrap();
        assert_eq!(current.title(), "IT Week Update");
        assert_eq!(current.body(), Some("new labs open"));
        assert_eq!(current.department(), Some("BSIT"));
        assert_eq!(current.part_count(), 2);
    }

    #[test]
    fn empty_result_shows_the_no_data_placeholder() {
        let mut selection = SelectionState::default();
        let generation = selection.begin_pick();
        let mut popup = ActivePopup::default();

        assert!(apply_lookup_result(
            &context(generation, "bshm"),
            Ok(Vec::new()),
            None,
            &selection,
            &mut popup,
        ));
        let current = popup.0.as_ref().unwrap();
        assert_eq!(current.title(), "IT Building");
        assert_eq!(
            current.body(),
            Some("No data has been posted for this building yet.")
        );
        assert_eq!(current.part_count(), 0);
    }

    #[test]
    fn failed_lookup_falls_back_to_the_curated_profile() {
        use crate::engine::assets::role_map::RoleProfile;
        use std::collections::HashMap;

        let mut roles = HashMap::new();
        roles.insert(
            "bsit".to_string(),
            RoleProfile {
                display_name: "Information Technology Building".to_string(),
                department: Some("College of Information Technology".to_string()),
                description: Some("Computer labs and faculty offices.".to_string()),
            },
        );
        let config = RoleConfig {
            assignments: HashMap::new(),
            roles,
            info_base_url: "http://localhost:8000".to_string(),
            initial_focus: None,
        };

        let mut selection = SelectionState::default();
        let generation = selection.begin_pick();
        let mut popup = ActivePopup::default();

        assert!(apply_lookup_result(
            &context(generation, "bsit"),
            Err("connection refused".to_string()),
            Some(&config),
            &selection,
            &mut popup,
        ));
        let current = popup.0.as_ref().unwrap();
        assert_eq!(current.title(), "Information Technology Building");
        assert_eq!(current.body(), Some("Computer labs and faculty offices."));
    }

    #[test]
    fn failed_lookup_without_a_profile_shows_a_generic_message() {
        let mut selection = SelectionState::default();
        let generation = selection.begin_pick();
        let mut popup = ActivePopup::default();

        assert!(apply_lookup_result(
            &context(generation, "bsit"),
            Err("timed out".to_string()),
            None,
            &selection,
            &mut popup,
        ));
        assert_eq!(
            popup.0.as_ref().unwrap().body(),
            Some("Unable to fetch dynamic info (server error).")
        );
    }

    #[test]
    fn clearing_returns_to_idle_without_losing_the_generation() {
        let mut selection = SelectionState {
            phase: SelectionPhase::GroupSelected,
            selected_id: Some("Hall-A".to_string()),
            generation: 7,
        };
        selection.clear();
        assert_eq!(selection.phase, SelectionPhase::Idle);
        assert!(selection.selected_id.is_none());
        assert_eq!(selection.generation, 7);
    }

    #[test]
    fn popup_projection_counts_parts_per_variant() {
        let group = Popup {
            content: PopupContent::Group {
                id: "Hall-A".to_string(),
                name: "Hall A".to_string(),
                department: None,
                description: None,
                part_count: 4,
            },
            origin: Vec2::ZERO,
            fly: FlyRef::None,
        };
        let part = Popup {
            content: PopupContent::Part {
                id: "3DGeom-9".to_string(),
                name: "Part".to_string(),
                department: None,
                description: None,
            },
            origin: Vec2::ZERO,
            fly: FlyRef::None,
        };
        assert_eq!(group.part_count(), 4);
        assert_eq!(part.part_count(), 1);
        assert_eq!(group.title(), "Hall A");
        assert!(part.department().is_none());
    }
}
