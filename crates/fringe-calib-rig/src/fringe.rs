//! Projector-side correspondence measurement with phase-shifted fringes.

use fringe_calib_core::GrayImage;
use fringe_calib_phase::{
    FringeOrientation, FringeSynthesizer, PhaseDecoder, PhaseMeasurement, PhaseUnwrapper, Pitch,
    ProjectorMap, TwoWavelengthUnwrapper, UnwrapError, UnwrapParams, UnwrappedPhaseMap,
};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::capture::illuminate_then_capture;
use crate::{AcquisitionParams, CalibrationError, CaptureSource, ProjectionSink};

/// Projects both fringe orientations at both pitches and turns the captures
/// into a camera-to-projector pixel map.
#[derive(Clone, Debug)]
pub struct FringeAcquisition {
    params: AcquisitionParams,
    pitches: [Pitch; 2],
    synth: FringeSynthesizer,
    decoder: PhaseDecoder,
    unwrapper: TwoWavelengthUnwrapper,
}

impl FringeAcquisition {
    pub fn new(
        params: &AcquisitionParams,
        unwrap: &UnwrapParams,
    ) -> Result<Self, CalibrationError> {
        let [short, long] = params.pitches;
        let pitches = match (Pitch::new(short), Pitch::new(long)) {
            (Some(s), Some(l)) if s < l => [s, l],
            _ => return Err(UnwrapError::InvalidPitches { short, long }.into()),
        };
        Ok(Self {
            params: params.clone(),
            pitches,
            synth: FringeSynthesizer::new(params.fringe_count),
            decoder: PhaseDecoder::new(params.fringe_count)?,
            unwrapper: TwoWavelengthUnwrapper::new(unwrap.clone()),
        })
    }

    /// Run the four fringe sets (horizontal then vertical, short then long
    /// pitch) and build the projector map.
    ///
    /// Fails with [`UnwrapError::BeatTooShort`] before projecting anything
    /// when the projector is larger than the pitches can unwrap.
    #[cfg_attr(feature = "tracing", instrument(level = "info", skip_all))]
    pub fn measure(
        &self,
        camera: &mut dyn CaptureSource,
        sink: &mut dyn ProjectionSink,
    ) -> Result<ProjectorMap, CalibrationError> {
        self.check_extent(sink)?;
        let horizontal = self.measure_orientation(camera, sink, FringeOrientation::Horizontal)?;
        let vertical = self.measure_orientation(camera, sink, FringeOrientation::Vertical)?;
        Ok(ProjectorMap::new(horizontal, vertical)?)
    }

    /// Reject projectors wider or taller than the unwrapping range.
    pub(crate) fn check_extent(&self, sink: &dyn ProjectionSink) -> Result<(), UnwrapError> {
        let [short, long] = self.pitches.map(Pitch::get);
        let size = sink.size();
        let extent = size.width.max(size.height) as f32;
        if TwoWavelengthUnwrapper::unambiguous_range(short, long) <= extent {
            return Err(UnwrapError::BeatTooShort {
                beat: TwoWavelengthUnwrapper::beat_wavelength(short, long),
                extent,
            });
        }
        Ok(())
    }

    fn measure_orientation(
        &self,
        camera: &mut dyn CaptureSource,
        sink: &mut dyn ProjectionSink,
        orientation: FringeOrientation,
    ) -> Result<UnwrappedPhaseMap, CalibrationError> {
        let [short, long] = self.pitches;
        let short = self.measure_set(camera, sink, short, orientation)?;
        let long = self.measure_set(camera, sink, long, orientation)?;
        Ok(self.unwrapper.unwrap(&short, &long)?)
    }

    fn measure_set(
        &self,
        camera: &mut dyn CaptureSource,
        sink: &mut dyn ProjectionSink,
        pitch: Pitch,
        orientation: FringeOrientation,
    ) -> Result<PhaseMeasurement, CalibrationError> {
        let patterns = self.synth.generate_set(sink.size(), pitch, orientation);
        let mut captures: Vec<GrayImage> = Vec::with_capacity(patterns.len());
        for pattern in &patterns {
            let image = pattern.to_gray_u8();
            captures.push(illuminate_then_capture(sink, camera, &image, &self.params)?);
            log::debug!(
                "captured {:?} fringe {}/{} at pitch {}",
                orientation,
                pattern.phase_index + 1,
                patterns.len(),
                pitch.get()
            );
        }
        let wrapped = self.decoder.decode(&captures)?;
        Ok(PhaseMeasurement {
            wrapped,
            pitch: pitch.get(),
            orientation,
        })
    }
}
