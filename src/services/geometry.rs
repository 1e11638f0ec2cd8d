/// Landmark geometry
///
/// Pure functions measuring joint angles, trunk lean and limb position from
/// the landmarks of a single frame. Angles are in degrees and computed in
/// the image plane.

use crate::errors::AnalysisError;
use crate::models::{BodyLandmark, Landmark};

/// Arms shorter than this are treated as coincident points
const DEGENERATE_EPSILON: f64 = 1e-9;

/// Horizontal nose/toe offsets below this do not decide the facing direction
const FACING_EPSILON: f64 = 1e-3;

/// Calculate the angle at `b` formed by `a-b-c`
///
/// # Returns
/// Angle in [0, 180]; the same value for `(c, b, a)`.
///
/// # Errors
/// `DegenerateGeometry` when `a` or `c` coincides with `b`.
pub fn calculate_angle(a: &Landmark, b: &Landmark, c: &Landmark) -> Result<f64, AnalysisError> {
    let (ba_x, ba_y) = (a.x - b.x, a.y - b.y);
    let (bc_x, bc_y) = (c.x - b.x, c.y - b.y);

    if ba_x.hypot(ba_y) < DEGENERATE_EPSILON || bc_x.hypot(bc_y) < DEGENERATE_EPSILON {
        return Err(AnalysisError::DegenerateGeometry);
    }

    // atan2 stays finite for collinear arms, unlike acos of a rounded cosine
    let radians = bc_y.atan2(bc_x) - ba_y.atan2(ba_x);
    let mut angle = radians.abs().to_degrees();
    if angle > 180.0 {
        angle = 360.0 - angle;
    }

    Ok(angle.clamp(0.0, 180.0))
}

/// Calculate the trunk inclination from vertical
///
/// The trunk line runs from the hip midpoint to the shoulder midpoint.
/// Positive values lean toward `facing` (+1 = image right, -1 = image left).
pub fn calculate_trunk_lean(
    left_shoulder: &Landmark,
    right_shoulder: &Landmark,
    left_hip: &Landmark,
    right_hip: &Landmark,
    facing: f64,
) -> Result<f64, AnalysisError> {
    let shoulders = left_shoulder.midpoint(right_shoulder, "shoulder_center");
    let hips = left_hip.midpoint(right_hip, "hip_center");

    let forward = (shoulders.x - hips.x) * facing.signum();
    // Image y grows downwards
    let up = hips.y - shoulders.y;

    if forward.hypot(up) < DEGENERATE_EPSILON {
        return Err(AnalysisError::DegenerateGeometry);
    }

    Ok(forward.atan2(up).to_degrees())
}

/// Torso elevation above the horizontal for a given lean (upright = 90)
pub fn trunk_posture_angle(trunk_lean: f64) -> f64 {
    90.0 - trunk_lean.abs()
}

/// Look up a named landmark usable at `min_visibility`
pub fn get_point<'a>(
    landmarks: &'a [Landmark],
    name: &str,
    min_visibility: f64,
) -> Result<&'a Landmark, AnalysisError> {
    landmarks
        .iter()
        .find(|lm| lm.name == name && lm.is_valid(min_visibility))
        .ok_or_else(|| AnalysisError::MissingLandmark(name.to_string()))
}

/// Direction the runner faces along the image x axis
///
/// Uses the nose relative to the shoulder midpoint, then the right toe
/// relative to the right heel. Defaults to +1 when neither decides.
pub fn facing_direction(landmarks: &[Landmark], min_visibility: f64) -> f64 {
    let point = |lm: BodyLandmark| get_point(landmarks, lm.name(), min_visibility).ok();

    if let (Some(nose), Some(left), Some(right)) = (
        point(BodyLandmark::Nose),
        point(BodyLandmark::LeftShoulder),
        point(BodyLandmark::RightShoulder),
    ) {
        let offset = nose.x - (left.x + right.x) / 2.0;
        if offset.abs() > FACING_EPSILON {
            return offset.signum();
        }
    }

    if let (Some(toe), Some(heel)) = (
        point(BodyLandmark::RightFootIndex),
        point(BodyLandmark::RightHeel),
    ) {
        let offset = toe.x - heel.x;
        if offset.abs() > FACING_EPSILON {
            return offset.signum();
        }
    }

    1.0
}

/// Horizontal ankle position ahead of the hip, in leg lengths
///
/// Returns `None` when the leg has no measurable length.
pub fn ankle_offset(hip: &Landmark, knee: &Landmark, ankle: &Landmark, facing: f64) -> Option<f64> {
    let leg_length = hip.distance_to(knee) + knee.distance_to(ankle);
    if leg_length < DEGENERATE_EPSILON {
        return None;
    }
    Some((ankle.x - hip.x) * facing.signum() / leg_length)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn lm(x: f64, y: f64) -> Landmark {
        Landmark::new("p", x, y)
    }

    #[test]
    fn test_right_angle() {
        let angle = calculate_angle(&lm(0.0, 0.0), &lm(0.0, 1.0), &lm(1.0, 1.0)).unwrap();
        assert!((angle - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_collinear_points() {
        let straight = calculate_angle(&lm(0.0, 0.0), &lm(0.5, 0.5), &lm(1.0, 1.0)).unwrap();
        assert!((straight - 180.0).abs() < 1e-9);

        let folded = calculate_angle(&lm(1.0, 1.0), &lm(0.0, 0.0), &lm(2.0, 2.0)).unwrap();
        assert!(folded.abs() < 1e-9);
    }

    #[test]
    fn test_reflex_angles_fold_back() {
        // Arms at +170 and -170 degrees differ by 340 one way, 20 the other
        let (cos, sin) = (170f64.to_radians().cos(), 170f64.to_radians().sin());
        let angle = calculate_angle(&lm(cos, sin), &lm(0.0, 0.0), &lm(cos, -sin)).unwrap();
        assert!((angle - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_coincident_points_are_degenerate() {
        let p = lm(0.3, 0.3);
        assert_matches!(calculate_angle(&p, &p, &lm(1.0, 1.0)), Err(AnalysisError::DegenerateGeometry));
        assert_matches!(calculate_angle(&p, &p, &p), Err(AnalysisError::DegenerateGeometry));
    }

    #[test]
    fn test_upright_trunk() {
        let lean = calculate_trunk_lean(
            &lm(0.45, 0.3),
            &lm(0.55, 0.3),
            &lm(0.45, 0.5),
            &lm(0.55, 0.5),
            1.0,
        )
        .unwrap();
        assert!(lean.abs() < 1e-9);
        assert!((trunk_posture_angle(lean) - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_forward_lean_sign_follows_facing() {
        // Shoulders 0.1 ahead of the hips over a 0.1 rise = 45 degrees
        let forward = calculate_trunk_lean(
            &lm(0.55, 0.4),
            &lm(0.65, 0.4),
            &lm(0.45, 0.5),
            &lm(0.55, 0.5),
            1.0,
        )
        .unwrap();
        assert!((forward - 45.0).abs() < 1e-9);

        let mirrored = calculate_trunk_lean(
            &lm(0.55, 0.4),
            &lm(0.65, 0.4),
            &lm(0.45, 0.5),
            &lm(0.55, 0.5),
            -1.0,
        )
        .unwrap();
        assert!((mirrored + 45.0).abs() < 1e-9);
        assert!((trunk_posture_angle(mirrored) - 45.0).abs() < 1e-9);
    }

    #[test]
    fn test_trunk_lean_degenerate() {
        let p = lm(0.5, 0.5);
        assert_matches!(
            calculate_trunk_lean(&p, &p, &p, &p, 1.0),
            Err(AnalysisError::DegenerateGeometry)
        );
    }

    #[test]
    fn test_get_point_respects_visibility() {
        let landmarks = vec![
            Landmark::new("left_hip", 0.4, 0.5).with_visibility(0.9),
            Landmark::new("right_hip", 0.6, 0.5).with_visibility(0.2),
        ];

        assert!(get_point(&landmarks, "left_hip", 0.5).is_ok());
        assert_matches!(
            get_point(&landmarks, "right_hip", 0.5),
            Err(AnalysisError::MissingLandmark(name)) if name == "right_hip"
        );
        assert_matches!(
            get_point(&landmarks, "left_knee", 0.5),
            Err(AnalysisError::MissingLandmark(_))
        );
    }

    #[test]
    fn test_facing_direction() {
        let facing_left = vec![
            Landmark::new("nose", 0.40, 0.2),
            Landmark::new("left_shoulder", 0.45, 0.3),
            Landmark::new("right_shoulder", 0.55, 0.3),
        ];
        assert_eq!(facing_direction(&facing_left, 0.5), -1.0);

        let by_toes = vec![
            Landmark::new("right_heel", 0.56, 0.9),
            Landmark::new("right_foot_index", 0.50, 0.9),
        ];
        assert_eq!(facing_direction(&by_toes, 0.5), -1.0);

        assert_eq!(facing_direction(&[], 0.5), 1.0);
    }

    #[test]
    fn test_ankle_offset() {
        let hip = lm(0.5, 0.5);
        let knee = lm(0.5, 0.6);
        let ankle = lm(0.5, 0.7);
        assert_eq!(ankle_offset(&hip, &knee, &ankle, 1.0), Some(0.0));

        let ahead = lm(0.6, 0.7);
        let offset = ankle_offset(&hip, &knee, &ahead, 1.0).unwrap();
        assert!(offset > 0.0);
        assert!((ankle_offset(&hip, &knee, &ahead, -1.0).unwrap() + offset).abs() < 1e-12);

        assert_eq!(ankle_offset(&hip, &hip, &hip, 1.0), None);
    }
}
