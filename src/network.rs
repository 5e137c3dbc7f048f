use crate::*;

/// Значения нейронов одного слоя
pub type NeuronLayer = Vec<f64>;
/// Веса входных связей одного нейрона (по номерам входов)
pub type NeuronWeights = Vec<f64>;
/// Веса слоя: по одному вектору на каждый нейрон слоя
pub type WeightLayer = Vec<NeuronWeights>;

/// Настройки сети: топология, веса, смещения и функции активации.
/// После настройки только читается, поэтому одну копию можно раздать
/// нескольким потокам (каждому свой [`NeuronLayers`]).
///
/// Веса, смещения и функции активации выровнены по номеру слоя-приемника:
/// элемент `k` относится к переходу из слоя `k` в слой `k + 1`.
#[derive(Clone, Debug, PartialEq)]
pub struct Parameters {
    topology: Topology,
    /// Веса по слоям: `[k][нейрон][вход]`
    weight_layers: Vec<WeightLayer>,
    /// Смещение каждого слоя, кроме входного
    biases: Vec<f64>,
    /// Функция активации каждого слоя, кроме входного
    activations: Vec<Activation>,
}

impl Parameters {
    /// Нулевые веса и смещения, функция активации - тождественная
    pub fn new(topology: Topology) -> Self {
        let weight_layers = topology
            .transitions()
            .map(|(inputs, neurons)| vec![vec![0.0; inputs]; neurons])
            .collect();
        let n = topology.weight_layers();
        Self {
            topology,
            weight_layers,
            biases: vec![0.0; n],
            activations: vec![Activation::Identity; n],
        }
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn weight_layers(&self) -> &[WeightLayer] {
        &self.weight_layers
    }

    pub fn bias_vector(&self) -> &[f64] {
        &self.biases
    }

    pub fn activation_vector(&self) -> &[Activation] {
        &self.activations
    }

    pub fn input_size(&self) -> usize {
        self.topology.input_size()
    }

    pub fn output_size(&self) -> usize {
        self.topology.output_size()
    }

    /// Количество нейронов всех слоев вместе с входами
    pub fn neuron_count(&self) -> usize {
        self.topology.neuron_count()
    }

    /// Длина плоского буфера весов
    pub fn parameter_count(&self) -> usize {
        self.topology.parameter_count()
    }

    /// Замена смещений. При несовпадении длины ничего не меняется.
    pub fn set_bias_vector(&mut self, biases: &[f64]) -> Result<()> {
        Error::check_len("bias vector", self.biases.len(), biases.len())?;
        self.biases.copy_from_slice(biases);
        tracing::debug!(?biases, "bias vector updated");
        Ok(())
    }

    /// Замена функций активации. При несовпадении длины ничего не меняется.
    pub fn set_activation_vector(&mut self, activations: &[Activation]) -> Result<()> {
        Error::check_len("activation vector", self.activations.len(), activations.len())?;
        self.activations.copy_from_slice(activations);
        tracing::debug!(?activations, "activation vector updated");
        Ok(())
    }

    /// Замена функций активации по номерам (см. [`Activation::index`]).
    /// Сначала проверяются все номера, потом что-то меняется.
    pub fn set_activation_indexes(&mut self, indexes: &[usize]) -> Result<()> {
        Error::check_len("activation vector", self.activations.len(), indexes.len())?;
        let activations = indexes
            .iter()
            .map(|i| Activation::from_index(*i))
            .collect::<Result<Vec<_>>>()?;
        self.set_activation_vector(&activations)
    }

    /// Загрузка всех весов из плоского буфера.
    /// Порядок: послойно от входа к выходу, внутри слоя по нейронам,
    /// внутри нейрона по номерам входов.
    pub fn set_weights_from_flat_buffer(&mut self, buffer: &[f64]) -> Result<()> {
        let expected = self.parameter_count();
        if buffer.len() != expected {
            return Err(Error::LengthMismatch { expected, actual: buffer.len() });
        }
        let mut values = buffer.iter();
        for weight in self.weight_layers.iter_mut().flatten().flatten() {
            // длина уже проверена
            if let Some(v) = values.next() {
                *weight = *v;
            }
        }
        tracing::debug!(count = expected, "weights loaded from flat buffer");
        Ok(())
    }

    /// Все веса одной линией, в том же порядке, что и для
    /// [`set_weights_from_flat_buffer`](Self::set_weights_from_flat_buffer)
    pub fn flat_weights(&self) -> Vec<f64> {
        let mut out = Vec::with_capacity(self.parameter_count());
        for weights in self.weight_layers.iter().flatten() {
            out.extend_from_slice(weights);
        }
        out
    }

    /// Замена весов целиком, с проверкой формы каждого слоя и нейрона
    pub fn set_weight_layers(&mut self, weight_layers: Vec<WeightLayer>) -> Result<()> {
        Error::check_len("weight layers", self.weight_layers.len(), weight_layers.len())?;
        for ((inputs, neurons), layer) in self.topology.transitions().zip(&weight_layers) {
            Error::check_len("weight layer", neurons, layer.len())?;
            for weights in layer {
                Error::check_len("neuron weights", inputs, weights.len())?;
            }
        }
        self.weight_layers = weight_layers;
        tracing::debug!(topology = %self.topology, "weight layers replaced");
        Ok(())
    }

    /// Заполнение весов случайными значениями из `range`.
    /// Смещения и функции активации не меняются.
    pub fn randomize(&mut self, rng: &mut dyn RngCore, range: RangeInclusive<f64>) {
        for weight in self.weight_layers.iter_mut().flatten().flatten() {
            *weight = rng.gen_range(range.clone());
        }
    }

    /// Рабочие слои нейронов под эту топологию
    pub fn scratch(&self) -> NeuronLayers {
        NeuronLayers::new(&self.topology)
    }

    /// Расчет в прямом направлении.
    /// Слои считаются строго по порядку, каждый по полностью готовому предыдущему:
    /// neuron = activation(w1*a1 + w2*a2 + ... + wn*an + bias)
    pub fn evaluate(&self, scratch: &mut NeuronLayers, input: &[f64]) -> Result<NeuronLayer> {
        Error::check_len("input layer", self.input_size(), input.len())?;
        scratch.check(&self.topology)?;

        scratch.layers[0].copy_from_slice(input);
        for (k, weight_layer) in self.weight_layers.iter().enumerate() {
            let (src, dst) = scratch.pair_mut(k);
            let bias = self.biases[k];
            let activation = self.activations[k];
            for (neuron, weights) in dst.iter_mut().zip(weight_layer) {
                let sum = weights
                    .iter()
                    .zip(src.iter())
                    .fold(0.0, |acc, (w, a)| acc + w * a);
                *neuron = activation.apply(sum + bias);
            }
        }
        tracing::trace!(topology = %self.topology, "network evaluated");
        Ok(scratch.output().to_vec())
    }

    /// Расчет пакета входов в несколько потоков.
    /// Настройки общие, рабочие слои у каждого потока свои.
    pub fn evaluate_batch(&self, inputs: &[NeuronLayer]) -> Result<Vec<NeuronLayer>> {
        inputs
            .par_iter()
            .map_init(|| self.scratch(), |scratch, input| self.evaluate(scratch, input))
            .collect()
    }
}

/// Рабочие слои нейронов (первый - копия входа).
/// Перезаписываются целиком при каждом расчете.
#[derive(Clone, Debug, PartialEq)]
pub struct NeuronLayers {
    layers: Vec<NeuronLayer>,
}

impl NeuronLayers {
    pub fn new(topology: &Topology) -> Self {
        Self {
            layers: topology.layers().iter().map(|l| vec![0.0; l.neurons]).collect(),
        }
    }

    /// Значения всех слоев после последнего расчета
    pub fn layers(&self) -> &[NeuronLayer] {
        &self.layers
    }

    /// Выходной слой
    pub fn output(&self) -> &[f64] {
        self.layers.last().map(Vec::as_slice).unwrap_or(&[])
    }

    fn check(&self, topology: &Topology) -> Result<()> {
        Error::check_len("neuron layers", topology.len(), self.layers.len())?;
        for (layer, t) in self.layers.iter().zip(topology.layers()) {
            Error::check_len("neuron layer", t.neurons, layer.len())?;
        }
        Ok(())
    }

    /// Пара (готовый слой `k`, слой `k + 1` для записи)
    fn pair_mut(&mut self, k: usize) -> (&[f64], &mut [f64]) {
        let (done, rest) = self.layers.split_at_mut(k + 1);
        (&done[k], &mut rest[0])
    }
}

/// Сеть с собственными рабочими слоями
#[derive(Clone, Debug)]
pub struct Network {
    params: Parameters,
    layers: NeuronLayers,
}

impl Network {
    /// Конструктор: размеры входа, выхода и скрытых слоев (могут отсутствовать)
    pub fn new(input: usize, output: usize, hidden: &[usize]) -> Result<Self> {
        let topology = Topology::new(input, output, hidden)?;
        tracing::debug!(%topology, "network created");
        Ok(Self::from_parameters(Parameters::new(topology)))
    }

    /// Создание сети со случайными весами в [-1, 1] и указанной топологией
    pub fn random(rng: &mut dyn RngCore, topology: Topology) -> Self {
        let mut params = Parameters::new(topology);
        params.randomize(rng, -1.0..=1.0);
        Self::from_parameters(params)
    }

    pub fn from_parameters(params: Parameters) -> Self {
        let layers = params.scratch();
        Self { params, layers }
    }

    pub fn parameters(&self) -> &Parameters {
        &self.params
    }

    /// Топологию через сеттеры поменять нельзя, поэтому рабочие слои остаются годными
    pub fn parameters_mut(&mut self) -> &mut Parameters {
        &mut self.params
    }

    pub fn into_parameters(self) -> Parameters {
        self.params
    }

    pub fn topology(&self) -> &Topology {
        self.params.topology()
    }

    pub fn parameter_count(&self) -> usize {
        self.params.parameter_count()
    }

    pub fn set_bias_vector(&mut self, biases: &[f64]) -> Result<()> {
        self.params.set_bias_vector(biases)
    }

    pub fn set_activation_vector(&mut self, activations: &[Activation]) -> Result<()> {
        self.params.set_activation_vector(activations)
    }

    pub fn set_weights_from_flat_buffer(&mut self, buffer: &[f64]) -> Result<()> {
        self.params.set_weights_from_flat_buffer(buffer)
    }

    /// Расчет выхода по входу
    pub fn evaluate(&mut self, input: &[f64]) -> Result<NeuronLayer> {
        self.params.evaluate(&mut self.layers, input)
    }
}
