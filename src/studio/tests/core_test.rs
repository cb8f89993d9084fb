#[cfg(test)]
mod core_test {

    use ndarray::array;

    use crate::classifier::trainer::TrainError;
    use crate::classifier::ClassifierHandle;
    use crate::device_camera::interface::CameraError;
    use crate::studio::core::{
        init, transition, CameraState, CaptureState, Effect, Event, FrameTask, Model, Source,
    };
    use crate::studio::render;
    use crate::studio::tests::fixture::FixedClassifier;

    fn handle() -> ClassifierHandle {
        ClassifierHandle::new(FixedClassifier {
            probabilities: array![0.5, 0.5],
        })
    }

    fn ready_model(class_count: usize) -> Model {
        let (model, _) = init(class_count);
        let (model, _) = transition(model, Event::EnableCameraPressed);
        let (mut model, _) = transition(model, Event::CameraEnableDone(Ok(())));
        for class in 0..class_count {
            model = transition(model, Event::SourceReady(Source::Class(class))).0;
        }
        transition(model, Event::SourceReady(Source::Prediction)).0
    }

    #[test]
    fn test_init() {
        let (model, effects) = init(3);

        assert_eq!(model.camera, CameraState::Off);
        assert_eq!(model.capture, CaptureState::Idle);
        assert_eq!(model.class_sources_ready, vec![false; 3]);
        assert!(!model.predicting);
        assert!(!model.training);
        assert!(model.running);
        assert_eq!(
            effects,
            vec![Effect::RenderStatus(render::STATUS_LOADED.to_string())]
        );
    }

    #[test]
    fn test_enable_camera_flow() {
        let (model, _) = init(2);

        let (model, effects) = transition(model, Event::EnableCameraPressed);
        assert_eq!(model.camera, CameraState::Requesting);
        assert_eq!(effects, vec![Effect::EnableCamera]);

        // A second press while the request is in flight does nothing.
        let (model, effects) = transition(model, Event::EnableCameraPressed);
        assert!(effects.is_empty());

        let (model, effects) = transition(model, Event::CameraEnableDone(Ok(())));
        assert_eq!(model.camera, CameraState::On);
        assert_eq!(
            effects,
            vec![
                Effect::RenderCameraEnabled,
                Effect::WatchSource(Source::Class(0)),
                Effect::WatchSource(Source::Class(1)),
                Effect::WatchSource(Source::Prediction),
            ]
        );

        let (model, effects) = transition(model, Event::SourceReady(Source::Class(1)));
        assert_eq!(model.class_sources_ready, vec![false, true]);
        assert!(!model.prediction_source_ready);
        assert!(effects.is_empty());
    }

    #[test]
    fn test_unsupported_camera_renders_message() {
        let (model, _) = init(2);
        let (model, _) = transition(model, Event::EnableCameraPressed);

        let (model, effects) =
            transition(model, Event::CameraEnableDone(Err(CameraError::Unsupported)));

        assert_eq!(model.camera, CameraState::Unavailable);
        assert!(effects.contains(&Effect::RenderStatus(
            CameraError::Unsupported.to_string()
        )));

        // The user may try again.
        let (model, effects) = transition(model, Event::EnableCameraPressed);
        assert_eq!(model.camera, CameraState::Requesting);
        assert_eq!(effects, vec![Effect::EnableCamera]);
    }

    #[test]
    fn test_denied_camera_renders_message() {
        let (model, _) = init(2);
        let (model, _) = transition(model, Event::EnableCameraPressed);

        let (model, effects) = transition(
            model,
            Event::CameraEnableDone(Err(CameraError::Acquisition("busy".to_string()))),
        );

        assert_eq!(model.camera, CameraState::Unavailable);
        assert!(effects.contains(&Effect::RenderStatus(
            "Camera unavailable: could not acquire camera: busy".to_string()
        )));
    }

    #[test]
    fn test_capture_toggle_press_and_release() {
        let model = ready_model(2);

        let (model, effects) = transition(model, Event::CaptureToggled(0));
        assert_eq!(model.capture, CaptureState::Capturing(0));
        assert_eq!(effects, vec![Effect::RequestFrame(FrameTask::Capture)]);

        let (model, effects) = transition(model, Event::CaptureToggled(0));
        assert_eq!(model.capture, CaptureState::Idle);
        assert!(effects.is_empty());
    }

    #[test]
    fn test_capture_switch_keeps_one_class_active() {
        let model = ready_model(3);

        let (model, _) = transition(model, Event::CaptureToggled(0));
        let (model, effects) = transition(model, Event::CaptureToggled(2));

        assert_eq!(model.capture, CaptureState::Capturing(2));
        // The tick requested for class 0 is still outstanding.
        assert!(effects.is_empty());
        assert!(model.capture_frame_pending);

        let (model, effects) = transition(model, Event::Frame(FrameTask::Capture));
        assert_eq!(
            effects,
            vec![
                Effect::CaptureSample { class: 2 },
                Effect::RequestFrame(FrameTask::Capture),
            ]
        );
        assert!(model.capture_frame_pending);
    }

    #[test]
    fn test_capture_frame_rearms_while_capturing() {
        let model = ready_model(2);
        let (model, _) = transition(model, Event::CaptureToggled(1));

        let (model, effects) = transition(model, Event::Frame(FrameTask::Capture));
        assert_eq!(
            effects,
            vec![
                Effect::CaptureSample { class: 1 },
                Effect::RequestFrame(FrameTask::Capture),
            ]
        );

        let (model, _) = transition(model, Event::CaptureToggled(1));
        let (model, effects) = transition(model, Event::Frame(FrameTask::Capture));
        assert!(effects.is_empty());
        assert!(!model.capture_frame_pending);
    }

    #[test]
    fn test_capture_polls_until_source_ready() {
        let (model, _) = init(2);
        let (model, _) = transition(model, Event::CaptureToggled(0));

        let (model, effects) = transition(model, Event::Frame(FrameTask::Capture));
        assert_eq!(effects, vec![Effect::RequestFrame(FrameTask::Capture)]);

        let (model, _) = transition(model, Event::SourceReady(Source::Class(0)));
        let (_, effects) = transition(model, Event::Frame(FrameTask::Capture));
        assert!(effects.contains(&Effect::CaptureSample { class: 0 }));
    }

    #[test]
    fn test_capture_unknown_class_warns() {
        let model = ready_model(2);

        let (model, effects) = transition(model, Event::CaptureToggled(5));

        assert_eq!(model.capture, CaptureState::Idle);
        assert!(matches!(effects.as_slice(), [Effect::Warn(_)]));
    }

    #[test]
    fn test_train_stops_loops() {
        let model = ready_model(2);
        let (model, _) = transition(model, Event::CaptureToggled(0));

        let (model, effects) = transition(model, Event::TrainPressed);
        assert_eq!(model.capture, CaptureState::Idle);
        assert!(!model.predicting);
        assert!(model.training);
        assert_eq!(
            effects,
            vec![
                Effect::RenderStatus(render::STATUS_TRAINING.to_string()),
                Effect::Train,
            ]
        );

        let (_, effects) = transition(model, Event::TrainPressed);
        assert!(effects.is_empty());
    }

    #[test]
    fn test_train_done_starts_prediction_loop() {
        let model = ready_model(2);
        let (model, _) = transition(model, Event::TrainPressed);
        let classifier = handle();

        let (model, effects) = transition(model, Event::TrainDone(Ok(classifier.clone())));

        assert!(!model.training);
        assert!(model.predicting);
        assert_eq!(
            effects,
            vec![
                Effect::InstallClassifier(classifier),
                Effect::RenderStatus(render::STATUS_PREDICTING.to_string()),
                Effect::RequestFrame(FrameTask::Predict),
            ]
        );

        let (model, effects) = transition(model, Event::Frame(FrameTask::Predict));
        assert_eq!(
            effects,
            vec![Effect::Predict, Effect::RequestFrame(FrameTask::Predict)]
        );
        assert!(model.predict_frame_pending);
    }

    #[test]
    fn test_retrain_while_predict_tick_pending_requests_no_second_tick() {
        let model = ready_model(2);
        let (model, _) = transition(model, Event::TrainPressed);
        let (model, _) = transition(model, Event::TrainDone(Ok(handle())));
        let (model, _) = transition(model, Event::TrainPressed);

        let (model, effects) = transition(model, Event::TrainDone(Ok(handle())));

        assert!(!effects.contains(&Effect::RequestFrame(FrameTask::Predict)));
        assert!(model.predict_frame_pending);
    }

    #[test]
    fn test_train_failure_reports_status() {
        let model = ready_model(2);
        let (model, _) = transition(model, Event::TrainPressed);

        let (model, effects) = transition(model, Event::TrainDone(Err(TrainError::NoSamples)));

        assert!(!model.training);
        assert!(!model.predicting);
        assert!(effects.contains(&Effect::RenderStatus(
            "Training failed: no samples collected".to_string()
        )));
    }

    #[test]
    fn test_reset_stops_loops_and_clears_samples() {
        let model = ready_model(2);
        let (model, _) = transition(model, Event::TrainPressed);
        let (model, _) = transition(model, Event::TrainDone(Ok(handle())));
        let (model, _) = transition(model, Event::CaptureToggled(1));

        let (model, effects) = transition(model, Event::ResetPressed);

        assert_eq!(model.capture, CaptureState::Idle);
        assert!(!model.predicting);
        assert_eq!(
            effects,
            vec![
                Effect::ClearSamples,
                Effect::RenderStatus(render::STATUS_NO_DATA.to_string()),
            ]
        );

        // Outstanding ticks find nothing to do and do not re-arm.
        let (model, effects) = transition(model, Event::Frame(FrameTask::Predict));
        assert!(effects.is_empty());
        let (model, effects) = transition(model, Event::Frame(FrameTask::Capture));
        assert!(effects.is_empty());
        assert!(!model.capture_frame_pending);
        assert!(!model.predict_frame_pending);
    }

    #[test]
    fn test_shutdown_ignores_later_events() {
        let model = ready_model(2);
        let (model, _) = transition(model, Event::CaptureToggled(0));

        let (model, effects) = transition(model, Event::Shutdown);
        assert!(!model.running);
        assert_eq!(model.capture, CaptureState::Idle);
        assert_eq!(effects, vec![Effect::StopCameras]);

        let (model, effects) = transition(model, Event::CaptureToggled(1));
        assert!(effects.is_empty());
        assert_eq!(model.capture, CaptureState::Idle);
    }
}
