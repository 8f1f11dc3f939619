//! User-authored per-pixel channel programs.

use crate::effects::context::FrameContext;
use crate::effects::params::ParamMap;
use crate::expression::Program;
use crate::foundation::error::FxResult;
use crate::foundation::math::mix_channel;
use crate::surface::frame::Frame;

/// Variable slots visible to channel programs, in evaluation order.
pub const VARIABLES: [&str; 10] = ["r", "g", "b", "a", "x", "y", "w", "h", "t", "i"];
/// Parameter keys holding one program per output channel.
pub const CHANNELS: [&str; 4] = ["r", "g", "b", "a"];

/// Compile a single channel program against [`VARIABLES`].
pub fn compile_channel(source: &str) -> FxResult<Program> {
    Program::compile(source, &VARIABLES)
}

/// Compiled channel programs, rebuilt whenever a channel parameter changes.
#[derive(Debug, Default)]
pub(crate) struct CustomState {
    programs: Option<Vec<Program>>,
    stack: Vec<f64>,
}

impl CustomState {
    pub(crate) fn invalidate(&mut self) {
        self.programs = None;
    }

    pub(crate) fn release(&mut self) {
        self.programs = None;
        self.stack = Vec::new();
    }

    fn ensure_compiled(&mut self, params: &ParamMap) -> FxResult<()> {
        if self.programs.is_none() {
            let compiled = CHANNELS
                .iter()
                .map(|&key| compile_channel(params.str_or(key, key)))
                .collect::<FxResult<Vec<_>>>()?;
            self.programs = Some(compiled);
        }
        Ok(())
    }
}

pub(crate) fn apply(
    params: &ParamMap,
    intensity: f32,
    frame: &mut Frame,
    ctx: &FrameContext<'_>,
    state: &mut CustomState,
) -> FxResult<()> {
    if frame.is_empty() {
        return Ok(());
    }
    state.ensure_compiled(params)?;
    let CustomState { programs, stack } = state;
    let programs = programs.as_deref().unwrap_or_default();
    let active: Vec<(usize, &Program)> = programs
        .iter()
        .enumerate()
        .filter(|(c, p)| !p.is_passthrough(*c))
        .collect();
    if active.is_empty() {
        return Ok(());
    }

    let (w, h) = (frame.width, frame.height);
    let t = f64::from(ctx.elapsed_secs());
    let mut vars = [0.0f64; VARIABLES.len()];
    vars[6] = f64::from(w);
    vars[7] = f64::from(h);
    vars[8] = t;
    vars[9] = f64::from(intensity);

    for (idx, px) in frame.data.chunks_exact_mut(4).enumerate() {
        let idx = idx as u32;
        for c in 0..4 {
            vars[c] = f64::from(px[c]);
        }
        vars[4] = f64::from(idx % w);
        vars[5] = f64::from(idx / w);
        let mut out = [px[0], px[1], px[2], px[3]];
        for &(c, program) in &active {
            let v = program.eval(&vars, stack)?;
            out[c] = mix_channel(px[c], v as f32, intensity);
        }
        px.copy_from_slice(&out);
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/effects/custom.rs"]
mod tests;
