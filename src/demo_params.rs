use serde::{Deserialize, Serialize};

// Which update/shade kernel pair drives the demo.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    // A handful of points sliding along x.
    Simple,
    // A fountain with gravity and respawning.
    Dense,
}

impl Variant {
    pub fn default_capacity(&self) -> u32 {
        match self {
            Variant::Simple => 5,
            Variant::Dense => 100_000,
        }
    }
}

impl std::str::FromStr for Variant {
    type Err = String;
    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "simple" => Ok(Variant::Simple),
            "dense" => Ok(Variant::Dense),
            _ => Err(format!("unknown variant: {}", name)),
        }
    }
}

// Parameters that define the demo. These don't change at runtime.
#[derive(Debug, Serialize, Deserialize, Clone, Copy)]
pub struct DemoParams {
    pub window_width: u32,
    pub window_height: u32,
    pub vsync: bool,
    pub variant: Variant,
    pub clear_color: [f64; 4],

    // Overrides the variant's particle count when set.
    #[serde(default)]
    pub particle_capacity: Option<u32>,

    #[serde(default)]
    pub simulation: SimulationParams,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct SimulationParams {
    pub emission_point: [f32; 3],
    pub gravity: [f32; 3],
    pub speed_range: [f32; 2],
    pub life_range: [f32; 2],
    pub size_range: [f32; 2],
}

impl Default for SimulationParams {
    fn default() -> Self {
        SimulationParams {
            emission_point: [0.0, -0.8, 0.0],
            gravity: [0.0, -1.0, 0.0],
            speed_range: [0.6, 1.4],
            life_range: [1.0, 3.0],
            size_range: [2.0, 8.0],
        }
    }
}

impl DemoParams {
    pub fn capacity(&self) -> u32 {
        self.particle_capacity
            .unwrap_or_else(|| self.variant.default_capacity())
    }
}

impl std::str::FromStr for DemoParams {
    type Err = toml::de::Error;
    fn from_str(serialized: &str) -> Result<Self, Self::Err> {
        let params = toml::from_str(serialized)?;
        Ok(params)
    }
}

impl Default for DemoParams {
    fn default() -> Self {
        DemoParams {
            window_width: 640,
            window_height: 480,
            vsync: false,
            variant: Variant::Dense,
            clear_color: [0.0, 0.0, 0.5, 0.0],
            particle_capacity: None,
            simulation: SimulationParams::default(),
        }
    }
}

pub fn get_demo_config_from_default_file() -> DemoParams {
    let config_data = include_str!("../demo_config.toml");
    match config_data.parse() {
        Ok(params) => params,
        Err(e) => {
            log::error!(
                "Failed to parse config file({}): {:?}",
                "../demo_config.toml",
                e
            );
            DemoParams::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smoke() {
        let params = DemoParams {
            variant: Variant::Simple,
            particle_capacity: Some(12),
            ..DemoParams::default()
        };
        let serialized = toml::to_string(&params).unwrap();
        println!("serialized = {}", serialized);
        let deserialized: DemoParams = toml::from_str(&serialized).unwrap();
        assert_eq!(deserialized.variant, Variant::Simple);
        assert_eq!(deserialized.capacity(), 12);
        assert_eq!(deserialized.simulation, params.simulation);
    }

    #[test]
    fn default_file_parses() {
        let params: DemoParams = include_str!("../demo_config.toml").parse().unwrap();
        assert_eq!(params.window_width, 640);
        assert_eq!(params.window_height, 480);
    }

    #[test]
    fn variant_capacity() {
        let mut params = DemoParams::default();
        params.variant = Variant::Simple;
        assert_eq!(params.capacity(), 5);
        params.variant = Variant::Dense;
        assert_eq!(params.capacity(), 100_000);
        assert_eq!("dense".parse::<Variant>(), Ok(Variant::Dense));
        assert!("sparse".parse::<Variant>().is_err());
    }

    #[test]
    fn missing_simulation_table_uses_defaults() {
        let params: DemoParams = r#"
            window_width = 800
            window_height = 600
            vsync = true
            variant = "simple"
            clear_color = [0.0, 0.0, 0.0, 1.0]
        "#
        .parse()
        .unwrap();
        assert_eq!(params.simulation, SimulationParams::default());
        assert_eq!(params.particle_capacity, None);
    }
}
