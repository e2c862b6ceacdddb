use std::path::{Path, PathBuf};

use anyhow::Context;

use penumbra_engine::core::{App, AppControl, FrameCtx};
use penumbra_engine::render::{FrameInputs, NoiseImage, PipelineConfig, SsaoPipeline};
use penumbra_engine::scene::Scene;

use crate::controls::{command_for, ViewConfig, ViewerState};
use crate::scene::{build_scene, initial_camera, initial_light};

pub const TITLE: &str = "penumbra ssao";

const TITLE_REFRESH_FRAMES: u64 = 15;
const FPS_LOG_FRAMES: u64 = 300;

/// Smallest window edge the half-resolution targets can be built for.
const MIN_WINDOW_EDGE: u32 = 2;

pub fn noise_path() -> PathBuf {
    PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/assets/textures/random.png"))
}

/// Loads the noise tile; a missing or undecodable asset stops startup.
pub fn load_noise(path: &Path) -> anyhow::Result<NoiseImage> {
    let noise = NoiseImage::load(path).context("noise asset is required")?;
    log::info!(
        "noise texture {}x{} from {}",
        noise.width(),
        noise.height(),
        path.display()
    );
    Ok(noise)
}

/// Interactive SSAO viewer.
///
/// The pipeline is built on the first frame that has a usable window size,
/// since it needs the device and the surface format.
pub struct ViewerApp {
    state: ViewerState,
    scene: Scene,
    noise: NoiseImage,
    config: PipelineConfig,
    pipeline: Option<SsaoPipeline>,
}

impl ViewerApp {
    pub fn new() -> anyhow::Result<Self> {
        Ok(Self {
            state: ViewerState::new(initial_camera(), initial_light(), ViewConfig::default()),
            scene: build_scene(),
            noise: load_noise(&noise_path())?,
            config: PipelineConfig::default(),
            pipeline: None,
        })
    }

    fn handle_input(&mut self, ctx: &FrameCtx<'_, '_>) -> AppControl {
        for &key in &ctx.input_frame.key_triggers {
            let Some(cmd) = command_for(key, self.state.config()) else {
                continue;
            };
            if !self.state.apply(cmd) {
                return AppControl::Exit;
            }
        }
        AppControl::Continue
    }

    fn update_title(&self, ctx: &FrameCtx<'_, '_>) {
        if ctx.time.frame_index % TITLE_REFRESH_FRAMES != 0 {
            return;
        }
        let title = if self.state.show_fps {
            format!(
                "{TITLE} | {} | {:.0} fps",
                self.state.mode.label(),
                ctx.time.average_fps
            )
        } else {
            TITLE.to_string()
        };
        ctx.window.set_title(&title);

        if self.state.show_fps && ctx.time.frame_index % FPS_LOG_FRAMES == 0 {
            log::info!("{:.1} fps ({})", ctx.time.average_fps, self.state.mode.label());
        }
    }
}

impl App for ViewerApp {
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        if self.handle_input(ctx) == AppControl::Exit {
            return AppControl::Exit;
        }

        let size = ctx.window.physical_size();
        if size.width < MIN_WINDOW_EDGE || size.height < MIN_WINDOW_EDGE {
            return AppControl::Continue;
        }

        self.update_title(ctx);

        let Self {
            state,
            scene,
            noise,
            config,
            pipeline,
        } = self;

        ctx.render(|rctx, target| {
            if pipeline.is_none() {
                let built = SsaoPipeline::new(
                    rctx.device,
                    rctx.queue,
                    rctx.surface_format,
                    rctx.size,
                    scene,
                    noise,
                    *config,
                )
                .context("failed to build ssao pipeline")?;
                *pipeline = Some(built);
            }
            let Some(pipeline) = pipeline.as_mut() else {
                return Ok(());
            };

            let out = pipeline.render(
                rctx,
                target,
                &FrameInputs {
                    camera: &state.camera,
                    light: &state.light,
                    eye_distance: state.eye_distance,
                    lighting: state.lighting,
                    mode: state.mode,
                },
            )?;
            state.camera = out.camera;
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_noise_asset_is_fatal() {
        let err = load_noise(Path::new("/nonexistent/random.png")).unwrap_err();
        assert!(format!("{err:#}").contains("noise asset is required"));
    }

    #[test]
    fn bundled_noise_asset_loads() {
        let noise = load_noise(&noise_path()).unwrap();
        assert_eq!((noise.width(), noise.height()), (64, 64));
    }
}
