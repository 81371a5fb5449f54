use crate::config::{
    parse_hex_color, ComputeConfig, RenderConfig, SceneParams, MATRIX_COUNTS, PARTICLES_MAX,
    WORKGROUP_SIZES,
};
use crate::SampleKind;
use console::Style;
use dialoguer::{theme::ColorfulTheme, Confirm, Input, MultiSelect, Select};

/// Interactive TUI for picking samples and their parameters
pub struct InteractiveTui {
    theme: ColorfulTheme,
}

impl Default for InteractiveTui {
    fn default() -> Self {
        Self::new()
    }
}

impl InteractiveTui {
    pub fn new() -> Self {
        Self {
            theme: ColorfulTheme::default(),
        }
    }

    /// Display the welcome banner
    pub fn show_banner(&self) {
        let header_style = Style::new().bold().cyan();
        let rule = "=".repeat(80);

        println!();
        println!("{}", header_style.apply_to(&rule));
        println!(
            "{}",
            header_style.apply_to(format!("{:^80}", "WEBGPU SAMPLES - Interactive Mode"))
        );
        println!("{}", header_style.apply_to(&rule));
        println!();
    }

    /// Main menu
    pub fn run(&self) -> Option<GallerySelection> {
        self.show_banner();

        let choices = &[
            "Quick run (every sample, default parameters)",
            "Choose samples and parameters",
            "Exit",
        ];

        let selection = Select::with_theme(&self.theme)
            .with_prompt("Choose an option")
            .items(choices)
            .default(0)
            .interact()
            .ok()?;

        match selection {
            0 => Some(GallerySelection {
                samples: SampleKind::all(),
                ..GallerySelection::default()
            }),
            1 => {
                let samples = self.select_samples()?;
                let render = self.configure_render()?;
                let params = if samples.iter().any(|s| s.uses_scene_params()) {
                    self.configure_scene()?
                } else {
                    SceneParams::default()
                };
                let compute = if samples.contains(&SampleKind::GpuCompute) {
                    self.configure_compute()?
                } else {
                    ComputeConfig::default()
                };
                Some(GallerySelection {
                    samples,
                    render,
                    params,
                    compute,
                })
            }
            _ => None,
        }
    }

    /// Select samples to run
    pub fn select_samples(&self) -> Option<Vec<SampleKind>> {
        let available = SampleKind::all();

        let mut items = vec!["All samples".to_string()];
        items.extend(
            available
                .iter()
                .map(|s| format!("{} - {}", s.name(), s.description())),
        );

        let selections = MultiSelect::with_theme(&self.theme)
            .with_prompt("Select samples (space to select, enter to confirm)")
            .items(&items)
            .interact()
            .ok()?;

        if selections.is_empty() || selections.contains(&0) {
            return Some(available);
        }

        // index 0 is "All samples"
        Some(
            selections
                .iter()
                .filter_map(|&i| available.get(i - 1).copied())
                .collect(),
        )
    }

    /// Surface size and frame count
    pub fn configure_render(&self) -> Option<RenderConfig> {
        let defaults = RenderConfig::default();
        let use_defaults = Confirm::with_theme(&self.theme)
            .with_prompt(format!(
                "Use default frame settings? ({}x{}, {} frames)",
                defaults.width, defaults.height, defaults.frames
            ))
            .default(true)
            .interact()
            .ok()?;

        if use_defaults {
            return Some(defaults);
        }

        let width: u32 = Input::with_theme(&self.theme)
            .with_prompt("Width")
            .default(defaults.width)
            .interact()
            .ok()?;
        let height: u32 = Input::with_theme(&self.theme)
            .with_prompt("Height")
            .default(defaults.height)
            .interact()
            .ok()?;
        let frames: u32 = Input::with_theme(&self.theme)
            .with_prompt("Frames")
            .default(defaults.frames)
            .interact()
            .ok()?;

        Some(defaults.with_size(width.max(1), height.max(1)).with_frames(frames))
    }

    /// Light intensities, triangle color and particle count
    pub fn configure_scene(&self) -> Option<SceneParams> {
        let defaults = SceneParams::default();
        let use_defaults = Confirm::with_theme(&self.theme)
            .with_prompt("Use default scene parameters?")
            .default(true)
            .interact()
            .ok()?;

        if use_defaults {
            return Some(defaults);
        }

        let ambient: f32 = Input::with_theme(&self.theme)
            .with_prompt("Ambient intensity (0-1)")
            .default(defaults.ambient)
            .interact()
            .ok()?;
        let point: f32 = Input::with_theme(&self.theme)
            .with_prompt("Point light intensity (0-1)")
            .default(defaults.point_intensity)
            .interact()
            .ok()?;
        let radius: f32 = Input::with_theme(&self.theme)
            .with_prompt("Point light radius (0-40)")
            .default(defaults.point_radius)
            .interact()
            .ok()?;
        let dir: f32 = Input::with_theme(&self.theme)
            .with_prompt("Directional light intensity (0-1)")
            .default(defaults.dir_intensity)
            .interact()
            .ok()?;
        let count: u32 = Input::with_theme(&self.theme)
            .with_prompt(format!("Particle count (max {})", PARTICLES_MAX))
            .default(defaults.particle_count)
            .interact()
            .ok()?;
        let color: String = Input::with_theme(&self.theme)
            .with_prompt("Triangle color (#rrggbb)")
            .default("#ffff00".to_string())
            .validate_with(|input: &String| parse_hex_color(input).map(|_| ()))
            .interact_text()
            .ok()?;

        Some(
            defaults
                .with_ambient(ambient)
                .with_point_intensity(point)
                .with_point_radius(radius)
                .with_dir_intensity(dir)
                .with_particle_count(count)
                .with_color(parse_hex_color(&color).ok()?),
        )
    }

    /// Matrix count and workgroup size of `gpu_compute`
    pub fn configure_compute(&self) -> Option<ComputeConfig> {
        let count_items: Vec<String> = MATRIX_COUNTS.iter().map(|c| c.to_string()).collect();
        let count_selection = Select::with_theme(&self.theme)
            .with_prompt("Matrices to multiply")
            .items(&count_items)
            .default(MATRIX_COUNTS.len() - 1)
            .interact()
            .ok()?;

        let wg_items: Vec<String> = WORKGROUP_SIZES.iter().map(|s| s.to_string()).collect();
        let wg_selection = Select::with_theme(&self.theme)
            .with_prompt("Select workgroup size")
            .items(&wg_items)
            .default(1)
            .interact()
            .ok()?;

        Some(
            ComputeConfig::default()
                .with_matrix_count(MATRIX_COUNTS[count_selection])
                .with_workgroup_size(WORKGROUP_SIZES[wg_selection]),
        )
    }

    /// Ask whether to save results
    pub fn ask_save_results(&self) -> Option<String> {
        let save = Confirm::with_theme(&self.theme)
            .with_prompt("Save results?")
            .default(false)
            .interact()
            .ok()?;

        if !save {
            return None;
        }

        let formats = &["JSON", "CSV"];
        let format = Select::with_theme(&self.theme)
            .with_prompt("Format")
            .items(formats)
            .default(0)
            .interact()
            .ok()?;
        let default_name = if format == 1 { "results.csv" } else { "results.json" };

        Input::with_theme(&self.theme)
            .with_prompt("Filename")
            .default(default_name.to_string())
            .interact_text()
            .ok()
    }
}

/// What the user picked
#[derive(Debug, Clone)]
pub struct GallerySelection {
    pub samples: Vec<SampleKind>,
    pub render: RenderConfig,
    pub params: SceneParams,
    pub compute: ComputeConfig,
}

impl Default for GallerySelection {
    fn default() -> Self {
        Self {
            samples: Vec::new(),
            render: RenderConfig::default(),
            params: SceneParams::default(),
            compute: ComputeConfig::default(),
        }
    }
}
