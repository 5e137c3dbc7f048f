use crate::*;

/// Ограничения построителя сети.
/// Читаются из JSON, отсутствующие поля берутся по умолчанию.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuilderLimits {
    /// Минимум слоев вместе с входным и выходным
    pub min_layers: usize,
    /// Максимум скрытых слоев
    pub max_hidden_layers: usize,
    /// Минимум нейронов в любом слое
    pub min_neurons_per_layer: usize,
    /// Максимум нейронов в любом слое
    pub max_neurons_per_layer: usize,
    /// Нижняя граница смещения
    pub min_bias: f64,
    /// Верхняя граница смещения
    pub max_bias: f64,
}

impl Default for BuilderLimits {
    fn default() -> Self {
        Self {
            min_layers: 2,
            max_hidden_layers: 4,
            min_neurons_per_layer: 1,
            max_neurons_per_layer: 12,
            min_bias: -10.0,
            max_bias: 10.0,
        }
    }
}

impl BuilderLimits {
    /// Максимум слоев: вход, выход и все скрытые
    pub fn max_layers(&self) -> usize {
        self.max_hidden_layers.saturating_add(2)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let limits: Self = serde_json::from_str(json)?;
        limits.validate()?;
        Ok(limits)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Проверка самих ограничений на непротиворечивость
    pub fn validate(&self) -> Result<()> {
        if self.min_layers > self.max_layers() {
            return Err(Error::Configuration(format!(
                "min_layers {} exceeds max layers {}",
                self.min_layers,
                self.max_layers()
            )));
        }
        if self.min_neurons_per_layer > self.max_neurons_per_layer {
            return Err(Error::Configuration(format!(
                "min_neurons_per_layer {} exceeds max_neurons_per_layer {}",
                self.min_neurons_per_layer, self.max_neurons_per_layer
            )));
        }
        if self.min_bias.is_nan() || self.max_bias.is_nan() || self.min_bias > self.max_bias {
            return Err(Error::Configuration(format!(
                "bias range [{}, {}] is empty",
                self.min_bias, self.max_bias
            )));
        }
        Ok(())
    }
}

/// Построитель сети с проверкой всех настроек до создания.
/// Не заданные функции активации - тождественные, смещения и веса - нули.
#[derive(Clone, Debug, Default)]
pub struct NetworkBuilder {
    limits: BuilderLimits,
    layer_sizes: Vec<usize>,
    activations: Option<Vec<Activation>>,
    biases: Option<Vec<f64>>,
    weights: Option<Vec<f64>>,
}

impl NetworkBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(limits: BuilderLimits) -> Self {
        Self {
            limits,
            ..Self::default()
        }
    }

    /// Размеры слоев: [вход, скрытые..., выход]
    pub fn layer_sizes(mut self, sizes: Vec<usize>) -> Self {
        self.layer_sizes = sizes;
        self
    }

    pub fn activations(mut self, activations: Vec<Activation>) -> Self {
        self.activations = Some(activations);
        self
    }

    pub fn biases(mut self, biases: Vec<f64>) -> Self {
        self.biases = Some(biases);
        self
    }

    /// Веса одной линией (порядок как у [`Parameters::set_weights_from_flat_buffer`])
    pub fn weights(mut self, weights: Vec<f64>) -> Self {
        self.weights = Some(weights);
        self
    }

    pub fn limits(&self) -> &BuilderLimits {
        &self.limits
    }

    /// Проверки по порядку, возвращается первая ошибка
    pub fn validate(&self) -> Result<Topology> {
        let limits = &self.limits;
        let layers = self.layer_sizes.len();
        if layers < limits.min_layers.max(2) {
            return Err(Error::Configuration(format!(
                "too few neuron layers: {layers}, minimum is {}",
                limits.min_layers.max(2)
            )));
        }
        if layers > limits.max_layers() {
            return Err(Error::Configuration(format!(
                "too many neuron layers: {layers}, maximum is {}",
                limits.max_layers()
            )));
        }
        for (n, size) in self.layer_sizes.iter().enumerate() {
            if *size < limits.min_neurons_per_layer {
                return Err(Error::Configuration(format!(
                    "too few neurons in layer {n}: {size}, minimum is {}",
                    limits.min_neurons_per_layer
                )));
            }
            if *size > limits.max_neurons_per_layer {
                return Err(Error::Configuration(format!(
                    "too many neurons in layer {n}: {size}, maximum is {}",
                    limits.max_neurons_per_layer
                )));
            }
        }
        let topology = Topology::from_sizes(&self.layer_sizes)?;

        if let Some(activations) = &self.activations {
            Error::check_len("activation vector", topology.weight_layers(), activations.len())?;
        }
        if let Some(biases) = &self.biases {
            Error::check_len("bias vector", topology.weight_layers(), biases.len())?;
            for bias in biases {
                if bias.is_nan() || *bias < limits.min_bias {
                    return Err(Error::Configuration(format!(
                        "bias {bias} is less than minimum allowed {}",
                        limits.min_bias
                    )));
                }
                if *bias > limits.max_bias {
                    return Err(Error::Configuration(format!(
                        "bias {bias} is greater than maximum allowed {}",
                        limits.max_bias
                    )));
                }
            }
        }
        if let Some(weights) = &self.weights {
            let expected = topology.parameter_count();
            if weights.len() != expected {
                return Err(Error::LengthMismatch { expected, actual: weights.len() });
            }
        }
        Ok(topology)
    }

    /// Создание сети
    pub fn build(self) -> Result<Network> {
        let topology = self.validate().map_err(|e| {
            tracing::warn!(error = %e, sizes = ?self.layer_sizes, "network rejected by builder");
            e
        })?;
        let mut params = Parameters::new(topology);
        if let Some(activations) = &self.activations {
            params.set_activation_vector(activations)?;
        }
        if let Some(biases) = &self.biases {
            params.set_bias_vector(biases)?;
        }
        if let Some(weights) = &self.weights {
            params.set_weights_from_flat_buffer(weights)?;
        }
        tracing::debug!(topology = %params.topology(), "network built");
        Ok(Network::from_parameters(params))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_error(builder: NetworkBuilder) -> String {
        match builder.build() {
            Err(Error::Configuration(msg)) => msg,
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("builder accepted invalid network"),
        }
    }

    #[test]
    fn builds_configured_network() {
        let mut net = NetworkBuilder::new()
            .layer_sizes(vec![2, 3, 2, 1])
            .activations(vec![Activation::Identity; 3])
            .biases(vec![0.0; 3])
            .weights(vec![1.0; 14])
            .build()
            .unwrap();
        assert_eq!(net.evaluate(&[1.0, 1.0]).unwrap(), vec![12.0]);
    }

    #[test]
    fn defaults_when_omitted() {
        let net = NetworkBuilder::new().layer_sizes(vec![3, 2]).build().unwrap();
        let params = net.parameters();
        assert_eq!(params.bias_vector(), &[0.0]);
        assert_eq!(params.activation_vector(), &[Activation::Identity]);
        assert_eq!(params.flat_weights(), vec![0.0; 6]);
    }

    #[test]
    fn layer_count_limits() {
        let msg = config_error(NetworkBuilder::new().layer_sizes(vec![3]));
        assert!(msg.contains("too few neuron layers"), "{msg}");
        let msg = config_error(NetworkBuilder::new().layer_sizes(vec![1; 7]));
        assert!(msg.contains("too many neuron layers"), "{msg}");
        assert!(NetworkBuilder::new().layer_sizes(vec![1; 6]).build().is_ok());

        let limits = BuilderLimits { min_layers: 3, ..BuilderLimits::default() };
        let msg = config_error(NetworkBuilder::with_limits(limits).layer_sizes(vec![2, 2]));
        assert!(msg.contains("minimum is 3"), "{msg}");
    }

    #[test]
    fn neuron_count_limits() {
        let msg = config_error(NetworkBuilder::new().layer_sizes(vec![2, 0, 1]));
        assert!(msg.contains("too few neurons in layer 1"), "{msg}");
        let msg = config_error(NetworkBuilder::new().layer_sizes(vec![2, 13, 1]));
        assert!(msg.contains("too many neurons in layer 1"), "{msg}");
    }

    #[test]
    fn bias_limits() {
        let base = NetworkBuilder::new().layer_sizes(vec![1, 1, 1]);
        let msg = config_error(base.clone().biases(vec![0.0, -10.5]));
        assert!(msg.contains("less than minimum"), "{msg}");
        let msg = config_error(base.clone().biases(vec![10.5, 0.0]));
        assert!(msg.contains("greater than maximum"), "{msg}");
        assert!(base.biases(vec![-10.0, 10.0]).build().is_ok());
    }

    #[test]
    fn count_mismatches() {
        let base = NetworkBuilder::new().layer_sizes(vec![2, 3, 1]);
        assert!(matches!(
            base.clone().activations(vec![Activation::Relu]).build(),
            Err(Error::ShapeMismatch { what: "activation vector", expected: 2, actual: 1 })
        ));
        assert!(matches!(
            base.clone().biases(vec![0.0; 3]).build(),
            Err(Error::ShapeMismatch { what: "bias vector", .. })
        ));
        assert!(matches!(
            base.weights(vec![0.0; 8]).build(),
            Err(Error::LengthMismatch { expected: 9, actual: 8 })
        ));
    }

    #[test]
    fn limits_from_json() {
        let limits = BuilderLimits::from_json_str(r#"{ "max_neurons_per_layer": 64 }"#).unwrap();
        assert_eq!(limits.max_neurons_per_layer, 64);
        assert_eq!(limits.max_hidden_layers, 4);
        assert_eq!(limits.min_bias, -10.0);
        assert_eq!(limits.max_layers(), 6);

        assert!(matches!(
            BuilderLimits::from_json_str(r#"{ "min_bias": 5.0, "max_bias": 1.0 }"#),
            Err(Error::Configuration(_))
        ));
        assert!(matches!(BuilderLimits::from_json_str("{ nope"), Err(Error::Json(_))));

        // без ограничения по скрытым слоям
        let json = r#"{ "max_hidden_layers": 18446744073709551615 }"#;
        let limits = BuilderLimits::from_json_str(json).unwrap();
        assert_eq!(limits.max_hidden_layers, usize::MAX);
        assert_eq!(limits.max_layers(), usize::MAX);
        assert!(NetworkBuilder::with_limits(limits).layer_sizes(vec![1; 9]).build().is_ok());
    }

    #[test]
    fn limits_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("limits.json");
        std::fs::write(&path, r#"{ "max_hidden_layers": 1 }"#).unwrap();
        let limits = BuilderLimits::from_json_file(&path).unwrap();
        assert_eq!(limits.max_layers(), 3);
        assert!(matches!(
            BuilderLimits::from_json_file(dir.path().join("missing.json")),
            Err(Error::Io(_))
        ));
    }
}
