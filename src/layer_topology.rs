use crate::*;

/// Топология слоя
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LayerTopology {
    /// Количество нейронов в слое
    pub neurons: usize,
}

/// Топология сети: размеры слоев от входного к выходному.
/// Не меняется после создания сети.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Topology {
    layers: Vec<LayerTopology>,
}

impl Topology {
    /// Конструктор: [вход, скрытые слои..., выход].
    /// Нулевой вход или выход недопустим, скрытые слои могут быть пустыми.
    pub fn new(input: usize, output: usize, hidden: &[usize]) -> Result<Self> {
        if input == 0 {
            return Err(Error::Configuration("input layer must have at least one neuron".into()));
        }
        if output == 0 {
            return Err(Error::Configuration("output layer must have at least one neuron".into()));
        }
        let layers = std::iter::once(input)
            .chain(hidden.iter().copied())
            .chain(std::iter::once(output))
            .map(|neurons| LayerTopology { neurons })
            .collect();
        Ok(Self { layers })
    }

    /// Топология из полного списка размеров (как в файле модели)
    pub fn from_sizes(sizes: &[usize]) -> Result<Self> {
        match sizes {
            [input, hidden @ .., output] => Self::new(*input, *output, hidden),
            _ => Err(Error::Configuration(format!(
                "network needs an input and an output layer, got {} layer(s)",
                sizes.len()
            ))),
        }
    }

    pub fn layers(&self) -> &[LayerTopology] {
        &self.layers
    }

    /// Размеры слоев
    pub fn sizes(&self) -> Vec<usize> {
        self.layers.iter().map(|l| l.neurons).collect()
    }

    /// Количество слоев вместе с входным
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Всегда `false`: вход и выход есть у любой топологии
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn input_size(&self) -> usize {
        self.layers[0].neurons
    }

    pub fn output_size(&self) -> usize {
        self.layers[self.layers.len() - 1].neurons
    }

    /// Количество слоев весов (= слоев без входного)
    pub fn weight_layers(&self) -> usize {
        self.layers.len() - 1
    }

    /// Переходы между соседними слоями: (кол.входов, кол.нейронов)
    pub fn transitions(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.layers
            .iter()
            .tuple_windows()
            .map(|(src, dst)| (src.neurons, dst.neurons))
    }

    /// Общее количество весов (без смещений)
    pub fn parameter_count(&self) -> usize {
        self.transitions().map(|(src, dst)| src * dst).sum()
    }

    /// Общее количество нейронов вместе с входами
    pub fn neuron_count(&self) -> usize {
        self.layers.iter().map(|l| l.neurons).sum()
    }
}

impl fmt::Display for Topology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.layers.iter().map(|l| l.neurons).join(", "))
    }
}
