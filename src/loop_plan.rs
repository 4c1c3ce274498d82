use crate::error::PreviewError;

/// How many times each input stream is repeated before the encoder cuts the
/// result at the target duration. Both counts are at least one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoopPlan {
    pub video_loop_count: u32,
    pub audio_loop_count: u32,
}

impl LoopPlan {
    pub fn new(
        target_secs: f64,
        video_secs: f64,
        audio_secs: f64,
    ) -> Result<Self, PreviewError> {
        Ok(Self {
            video_loop_count: plan_loop_count(target_secs, video_secs)?,
            audio_loop_count: plan_loop_count(target_secs, audio_secs)?,
        })
    }
}

/// `max(1, ceil(target / source))`. Over-looping is harmless since the
/// encoder truncates at the target duration.
pub fn plan_loop_count(target_secs: f64, source_secs: f64) -> Result<u32, PreviewError> {
    if !source_secs.is_finite() || source_secs <= 0.0 {
        return Err(PreviewError::invalid_input(format!(
            "source duration must be positive, got {source_secs}"
        )));
    }
    if !target_secs.is_finite() {
        return Err(PreviewError::invalid_input(format!(
            "target duration must be finite, got {target_secs}"
        )));
    }

    let loops = (target_secs / source_secs).ceil();
    if loops > f64::from(u32::MAX) {
        return Err(PreviewError::invalid_input(format!(
            "source of {source_secs}s is too short to loop up to {target_secs}s"
        )));
    }
    Ok((loops as u32).max(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_multiple() {
        assert_eq!(plan_loop_count(30.0, 5.0).unwrap(), 6);
        assert_eq!(plan_loop_count(30.0, 3.0).unwrap(), 10);
    }

    #[test]
    fn rounds_up() {
        assert_eq!(plan_loop_count(30.0, 7.0).unwrap(), 5);
        assert_eq!(plan_loop_count(60.0, 59.9).unwrap(), 2);
    }

    #[test]
    fn at_least_one_pass() {
        assert_eq!(plan_loop_count(30.0, 45.0).unwrap(), 1);
        assert_eq!(plan_loop_count(30.0, 30.0).unwrap(), 1);
        assert_eq!(plan_loop_count(0.0, 5.0).unwrap(), 1);
    }

    #[test]
    fn looped_source_covers_target() {
        let targets = [1.0, 15.5, 30.0, 60.0, 119.99];
        let sources = [0.25, 0.5, 2.9, 3.0, 7.25, 29.97, 30.0, 61.0, 400.0];
        for &target in &targets {
            for &source in &sources {
                let loops = plan_loop_count(target, source).unwrap();
                assert!(loops >= 1);
                assert!(
                    f64::from(loops) * source >= target,
                    "{loops} x {source}s < {target}s"
                );
                if loops > 1 {
                    assert!(f64::from(loops - 1) * source < target, "over-planned {target}/{source}");
                }
            }
        }
    }

    #[test]
    fn non_positive_source_is_invalid() {
        for source in [0.0, -3.0, f64::NAN, f64::INFINITY] {
            let err = plan_loop_count(30.0, source).unwrap_err();
            assert!(err.is_invalid_input(), "{source}: {err}");
        }
    }

    #[test]
    fn plan_for_both_streams() {
        let plan = LoopPlan::new(30.0, 5.0, 3.0).unwrap();
        assert_eq!(
            plan,
            LoopPlan {
                video_loop_count: 6,
                audio_loop_count: 10,
            }
        );
        assert!(LoopPlan::new(30.0, 5.0, 0.0).is_err());
    }
}
