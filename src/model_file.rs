use crate::*;

/// Файл модели (JSON): топология, функции активации, смещения и веса одной линией.
/// Веса записаны в порядке [`Parameters::flat_weights`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModelFile {
    /// Размеры слоев: [вход, скрытые..., выход]
    pub layer_sizes: Vec<usize>,
    /// По одной на каждый слой, кроме входного
    pub activations: Vec<Activation>,
    /// По одному на каждый слой, кроме входного
    pub biases: Vec<f64>,
    pub weights: Vec<f64>,
}

impl ModelFile {
    pub fn from_parameters(params: &Parameters) -> Self {
        Self {
            layer_sizes: params.topology().sizes(),
            activations: params.activation_vector().to_vec(),
            biases: params.bias_vector().to_vec(),
            weights: params.flat_weights(),
        }
    }

    pub fn from_network(network: &Network) -> Self {
        Self::from_parameters(network.parameters())
    }

    /// Сборка сети через построитель, со всеми его проверками
    pub fn into_network(self, limits: &BuilderLimits) -> Result<Network> {
        NetworkBuilder::with_limits(limits.clone())
            .layer_sizes(self.layer_sizes)
            .activations(self.activations)
            .biases(self.biases)
            .weights(self.weights)
            .build()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Сохранение в файл
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        std::fs::write(path, self.to_json()?)?;
        tracing::debug!(path = %path.display(), weights = self.weights.len(), "model saved");
        Ok(())
    }

    /// Загрузка из файла
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let model = Self::from_json(&std::fs::read_to_string(path)?)?;
        tracing::debug!(path = %path.display(), sizes = ?model.layer_sizes, "model loaded");
        Ok(model)
    }
}
