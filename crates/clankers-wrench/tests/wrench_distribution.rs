//! End-to-end wrench distribution through the Clarabel backend.

use std::rc::Rc;

use approx::assert_relative_eq;
use clankers_contact::{
    Contact, SharedContact, VertexRegistry, local_wrench_list, total_wrench, wrench_list,
};
use clankers_core::{SceneConfig, Wrench, WrenchDistributionConfig};
use clankers_test_utils::{
    FOOT_FRIC_COEFF, left_foot_vertices, left_hand_pose, pinch_grasp_vertices, right_foot_pose,
    right_foot_vertices, standing_wrench,
};
use clankers_wrench::{DistributionState, WrenchDistribution};
use nalgebra::{Isometry3, Vector3};

const TRACKING_TOL: f64 = 1e-2;
const SOLVER_TOL: f64 = 1e-6;

fn left_foot(max_wrench: Option<Wrench>) -> SharedContact {
    Contact::surface(
        "LeftFoot",
        FOOT_FRIC_COEFF,
        &left_foot_vertices(),
        &Isometry3::identity(),
        max_wrench,
    )
    .into_shared()
}

fn right_foot() -> SharedContact {
    Contact::surface(
        "RightFoot",
        FOOT_FRIC_COEFF,
        &right_foot_vertices(),
        &right_foot_pose(),
        None,
    )
    .into_shared()
}

fn left_hand() -> SharedContact {
    Contact::grasp(
        "LeftHand",
        FOOT_FRIC_COEFF,
        &pinch_grasp_vertices(),
        &left_hand_pose(),
        None,
    )
    .into_shared()
}

fn assert_tracks(result: &Wrench, desired: &Wrench) {
    assert!(
        (result.to_vector() - desired.to_vector()).norm() < TRACKING_TOL,
        "result {result} does not track desired {desired}"
    );
}

fn assert_nonnegative(dist: &WrenchDistribution) {
    let min = dist.result_ridge_forces().min();
    assert!(min >= -SOLVER_TOL, "negative ridge force {min}");
}

fn assert_strictly_positive(dist: &WrenchDistribution) {
    let min = dist.result_ridge_forces().min();
    assert!(min > 0.0, "non-positive ridge force {min}");
}

/// Standing wrench over unbounded contacts: no ridge sits at its lower
/// bound, so every ridge force is strictly positive.
fn solve(contacts: Vec<SharedContact>) -> WrenchDistribution {
    let mut dist = WrenchDistribution::new(contacts, WrenchDistributionConfig::default()).unwrap();
    let desired = standing_wrench();
    let result = dist.run(&desired, &Vector3::zeros()).unwrap();
    assert_eq!(dist.state(), DistributionState::Solved);
    assert_tracks(&result, &desired);
    assert_strictly_positive(&dist);
    dist
}

#[test]
fn two_surface_contacts() {
    let dist = solve(vec![left_foot(None), right_foot()]);
    assert_eq!(dist.result_ridge_forces().len(), 16);
    for wrench in dist.result_wrench_list() {
        assert!(wrench.norm() > 1e-10);
    }
    assert_eq!(dist.backend_name(), "clarabel");
}

#[test]
fn contains_empty_contact() {
    let dist = solve(vec![
        left_foot(None),
        right_foot(),
        Contact::empty("LeftHand").into_shared(),
    ]);
    let list = dist.result_wrench_list();
    assert_eq!(list.len(), 3);
    assert!(list[0].norm() > 1e-10);
    assert!(list[1].norm() > 1e-10);
    assert_eq!(list[2], Wrench::zero());
}

#[test]
fn contains_grasp_contact() {
    let dist = solve(vec![left_foot(None), right_foot(), left_hand()]);
    assert_eq!(dist.result_ridge_forces().len(), 24);
    for wrench in dist.result_wrench_list() {
        assert!(wrench.norm() > 1e-10);
    }
}

#[test]
fn result_matches_aggregation() {
    let dist = solve(vec![left_foot(None), right_foot(), left_hand()]);
    let x = dist.result_ridge_forces().as_slice();
    let total = total_wrench(dist.contacts(), x, &Vector3::zeros());
    assert_relative_eq!(
        total.to_vector(),
        dist.result_total_wrench().to_vector(),
        epsilon = 1e-9
    );
    let summed: Wrench = wrench_list(dist.contacts(), x, &Vector3::zeros())
        .into_iter()
        .sum();
    assert_relative_eq!(summed.to_vector(), total.to_vector(), epsilon = 1e-9);
}

#[test]
fn max_wrench_bound_is_respected() {
    let bound = Wrench::new(
        Vector3::new(1e3, 1e3, 1e3),
        Vector3::new(1e3, 1e3, 100.0),
    );
    let desired = Wrench::new(Vector3::zeros(), Vector3::new(0.0, 0.0, 500.0));

    let mut bounded =
        WrenchDistribution::new(vec![left_foot(Some(bound))], WrenchDistributionConfig::default())
            .unwrap();
    bounded.run(&desired, &Vector3::zeros()).unwrap();
    assert_eq!(bounded.state(), DistributionState::Solved);
    let local = bounded.result_local_wrench_list()[0];
    assert!(local.within(&bound, 1e-3), "bounded local wrench {local}");
    assert!(local.force.z > 90.0);

    // Same problem without the bound pushes straight past it.
    let mut free =
        WrenchDistribution::new(vec![left_foot(None)], WrenchDistributionConfig::default())
            .unwrap();
    free.run(&desired, &Vector3::zeros()).unwrap();
    let local = free.result_local_wrench_list()[0];
    assert!(!local.within(&bound, 1e-3));
    assert_relative_eq!(local.force.z, 500.0, epsilon = TRACKING_TOL);
}

#[test]
fn bound_is_checked_in_contact_frame() {
    // The right foot frame is translated; the bound applies to its local wrench.
    let bound = Wrench::new(Vector3::new(1e3, 1e3, 1e3), Vector3::new(1e3, 1e3, 150.0));
    let right = right_foot();
    right.borrow_mut().set_max_wrench(Some(bound));
    let contacts = vec![left_foot(None), Rc::clone(&right)];

    let mut dist = WrenchDistribution::new(contacts, WrenchDistributionConfig::default()).unwrap();
    dist.run(&standing_wrench(), &Vector3::new(0.0, -0.2, 0.1))
        .unwrap();
    let locals = local_wrench_list(dist.contacts(), dist.result_ridge_forces().as_slice());
    assert!(locals[1].within(&bound, 1e-3));
    assert_nonnegative(&dist);
}

#[test]
fn ridge_force_upper_bound() {
    let mut config = WrenchDistributionConfig::default();
    config.ridge_force_min_max = [0.0, 5.0];
    let mut dist = WrenchDistribution::new(vec![left_foot(None), right_foot()], config).unwrap();
    let result = dist.run(&standing_wrench(), &Vector3::zeros()).unwrap();
    assert!(dist.result_ridge_forces().max() <= 5.0 + SOLVER_TOL);
    assert_nonnegative(&dist);
    // 16 ridges at 5 N cannot carry 500 N.
    assert!(result.force.z < 100.0);
}

#[test]
fn conflicting_bounds_are_infeasible() {
    let mut config = WrenchDistributionConfig::default();
    config.ridge_force_min_max = [10.0, 1e3];
    let bound = Wrench::new(Vector3::new(1e3, 1e3, 1e3), Vector3::new(1e3, 1e3, 1.0));
    let mut dist = WrenchDistribution::new(vec![left_foot(Some(bound))], config).unwrap();
    dist.run(&standing_wrench(), &Vector3::zeros()).unwrap();
    assert_eq!(dist.state(), DistributionState::Infeasible);
    assert_eq!(dist.result_ridge_forces().len(), 12);
}

#[test]
fn moment_origin_is_honoured() {
    let origin = Vector3::new(0.05, 0.0, 0.0);
    let mut dist = WrenchDistribution::new(
        vec![left_foot(None), right_foot()],
        WrenchDistributionConfig::default(),
    )
    .unwrap();
    let desired = standing_wrench();
    let result = dist.run(&desired, &origin).unwrap();
    assert_eq!(dist.state(), DistributionState::Solved);
    assert_tracks(&result, &desired);

    let x = dist.result_ridge_forces().as_slice();
    let about_origin = total_wrench(dist.contacts(), x, &origin);
    assert_relative_eq!(about_origin.to_vector(), result.to_vector(), epsilon = 1e-9);

    // The same forces seen from the world origin carry the shifted moment.
    let about_world = total_wrench(dist.contacts(), x, &Vector3::zeros());
    assert_relative_eq!(
        about_world.shifted(&origin).to_vector(),
        result.to_vector(),
        epsilon = 1e-9
    );
}

#[test]
fn contact_changes_between_runs() {
    let right = right_foot();
    let mut dist = WrenchDistribution::new(
        vec![left_foot(None), Rc::clone(&right)],
        WrenchDistributionConfig::default(),
    )
    .unwrap();
    let desired = standing_wrench();
    dist.run(&desired, &Vector3::zeros()).unwrap();

    // Pose update: the next run reads the moved geometry.
    right
        .borrow_mut()
        .update_vertices(&Isometry3::translation(0.0, -0.4, 0.3));
    let result = dist.run(&desired, &Vector3::zeros()).unwrap();
    assert_tracks(&result, &desired);
    let total = total_wrench(
        dist.contacts(),
        dist.result_ridge_forces().as_slice(),
        &Vector3::zeros(),
    );
    assert_relative_eq!(total.to_vector(), result.to_vector(), epsilon = 1e-9);

    // Contact set change: a hand joins, the problem grows.
    dist.set_contacts(vec![left_foot(None), Rc::clone(&right), left_hand()]);
    assert_eq!(dist.state(), DistributionState::Ready);
    let result = dist.run(&desired, &Vector3::zeros()).unwrap();
    assert_tracks(&result, &desired);
    assert_eq!(dist.result_ridge_forces().len(), 24);

    // And shrinks again to a single foot.
    dist.set_contacts(vec![left_foot(None)]);
    let result = dist.run(&desired, &Vector3::zeros()).unwrap();
    assert_eq!(dist.result_ridge_forces().len(), 12);
    assert_relative_eq!(result.force.z, 500.0, epsilon = TRACKING_TOL);
}

#[test]
fn markers_follow_result() {
    let dist = solve(vec![left_foot(None), right_foot()]);
    let markers = dist.markers(1.0, 0.05);
    // Left: 3 arrows, 3 pyramids, 1 region. Right: 1 arrow, 1 pyramid, 1 region.
    assert_eq!(markers.len(), 10);
    assert_eq!(markers[0].name(), "LeftFoot_Force0");
    assert_eq!(markers[7].name(), "RightFoot_Force0");
}

#[test]
fn scene_file_end_to_end() {
    let scene = SceneConfig::from_toml_str(include_str!(
        "../../../apps/clankers-wrench-app/scenes/biped.toml"
    ))
    .unwrap();
    let registry = VertexRegistry::from_scene(&scene).unwrap();
    let contacts = scene
        .contacts
        .iter()
        .map(|c| Contact::from_config(c, &registry).map(Contact::into_shared))
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    assert_eq!(contacts.len(), 4);

    let mut dist = WrenchDistribution::new(contacts, scene.wrench_distribution).unwrap();
    let desired = standing_wrench();
    let result = dist.run(&desired, &Vector3::zeros()).unwrap();
    assert_eq!(dist.state(), DistributionState::Solved);
    assert_tracks(&result, &desired);
    assert_nonnegative(&dist);

    let bound = dist.contacts()[1].borrow().max_wrench().copied().unwrap();
    assert!(dist.result_local_wrench_list()[1].within(&bound, 1e-3));
    assert_eq!(dist.result_wrench_list()[3], Wrench::zero());
}
