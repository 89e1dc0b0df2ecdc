use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use image::codecs::gif::{GifEncoder, Repeat};
use image::Delay;

use crate::error::{PipelineError, Result};
use crate::render::Frame;

/// Assembles rendered frames into one looping GIF.
///
/// The encoder is the ordering authority of the pipeline: it requires a
/// non-empty frame set sorted strictly ascending by date and fails fast
/// otherwise.
pub struct AnimationEncoder {
    delay_ms: u32,
    loop_forever: bool,
}

impl AnimationEncoder {
    pub fn new(delay_ms: u32, loop_forever: bool) -> Self {
        Self {
            delay_ms,
            loop_forever,
        }
    }

    pub fn encode(&self, frames: &[Frame], path: &Path) -> Result<()> {
        self.check_preconditions(frames)?;

        let writer = BufWriter::new(File::create(path)?);
        let mut encoder = GifEncoder::new_with_speed(writer, 10);
        if self.loop_forever {
            encoder.set_repeat(Repeat::Infinite)?;
        }

        for frame in frames {
            let delay = Delay::from_numer_denom_ms(self.delay_ms, 1);
            encoder.encode_frame(image::Frame::from_parts(frame.image.clone(), 0, 0, delay))?;
        }

        Ok(())
    }

    fn check_preconditions(&self, frames: &[Frame]) -> Result<()> {
        if frames.is_empty() {
            return Err(PipelineError::Encoding(
                "Cannot encode an empty frame set".to_string(),
            ));
        }

        for pair in frames.windows(2) {
            if pair[1].date == pair[0].date {
                return Err(PipelineError::Encoding(format!(
                    "Duplicate frame date {}",
                    pair[1].date
                )));
            }
            if pair[1].date < pair[0].date {
                return Err(PipelineError::Encoding(format!(
                    "Frames not in ascending date order at {}",
                    pair[1].date
                )));
            }
        }

        Ok(())
    }
}

/// Sort frames ascending by date, the order the encoder requires.
pub fn sort_frames(frames: &mut [Frame]) {
    frames.sort_by_key(|f| f.date);
}
