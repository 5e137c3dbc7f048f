use crate::*;

/// Те же настройки сети, собранные в модель candle для расчета пакетами.
/// Каждый слой весов - `Linear` (f64) и за ним функция активации слоя.
/// Результат совпадает с [`Parameters::evaluate`] с точностью до порядка суммирования.
pub struct TensorNetwork {
    model: Sequential,
    input_size: usize,
    output_size: usize,
}

impl TensorNetwork {
    /// Конструктор
    pub fn from_parameters(params: &Parameters) -> Result<Self> {
        let (layers_biases, layers_weights) = TensorNetwork::tensors(params)?;
        let model =
            TensorNetwork::model(&layers_biases, &layers_weights, params.activation_vector());
        tracing::debug!(topology = %params.topology(), "tensor model built");
        Ok(Self {
            model,
            input_size: params.input_size(),
            output_size: params.output_size(),
        })
    }

    /// Тензоры для расчета
    /// -Список смещений нейронов по слоям Vec<Tensor> (1, кол.нейр)
    /// -Список весов нейронов по слоям Vec<Tensor> (кол.нейр, кол.вх.связей)
    pub fn tensors(params: &Parameters) -> Result<(Vec<Tensor>, Vec<Tensor>)> {
        let mut layers_biases: Vec<Tensor> = Vec::new();
        let mut layers_weights: Vec<Tensor> = Vec::new();
        let layers = params
            .topology()
            .transitions()
            .zip(params.weight_layers())
            .zip(params.bias_vector());
        // обход послойно
        for (((l_count, n_count), layer), bias) in layers {
            if l_count == 0 || n_count == 0 {
                return Err(Error::Configuration(format!(
                    "tensor model needs non-empty layers, got topology {}",
                    params.topology()
                )));
            }
            // веса входных связей одного слоя, построчно по нейронам: (кол.нейр, кол.вх.связей)
            let w: Vec<f64> = layer.iter().flatten().copied().collect();
            let wt_mx = Tensor::new(w, &Device::Cpu)?.reshape((n_count, l_count))?;
            // смещение слоя одно на все нейроны
            let bt_mx = Tensor::new(vec![*bias; n_count], &Device::Cpu)?.reshape((1, n_count))?;
            // докидываем к выходу
            layers_biases.push(bt_mx);
            layers_weights.push(wt_mx);
        }
        Ok((layers_biases, layers_weights))
    }

    /// Модель для расчета
    pub fn model(
        layers_biases: &[Tensor],
        layers_weights: &[Tensor],
        act: &[Activation],
    ) -> Sequential {
        let mut model = seq();
        for ((wt_mx, bt_mx), func_act) in layers_weights.iter().zip(layers_biases).zip(act) {
            // слой линейный с активацией
            let model_layer = Linear::new(wt_mx.clone(), Some(bt_mx.clone()));
            model = model.add(model_layer);
            model = model.add(*func_act);
        }
        model
    }

    pub fn input_size(&self) -> usize {
        self.input_size
    }

    pub fn output_size(&self) -> usize {
        self.output_size
    }

    /// Расчет пакета входов за один проход модели
    pub fn forward_batch(&self, inputs: &[NeuronLayer]) -> Result<Vec<NeuronLayer>> {
        if inputs.is_empty() {
            return Ok(Vec::new());
        }
        for input in inputs {
            Error::check_len("input layer", self.input_size, input.len())?;
        }
        // входы построчно в один тензор: (кол.входов, кол.вх.связей)
        let xs: Vec<f64> = inputs.iter().flatten().copied().collect();
        let xs = Tensor::new(xs, &Device::Cpu)?.reshape((inputs.len(), self.input_size))?;
        let output_tensor = self.model.forward(&xs)?;
        Ok(output_tensor.to_vec2()?)
    }

    /// Расчет в прямом направлении для одного входа
    pub fn propagate(&self, input: &[f64]) -> Result<NeuronLayer> {
        let mut out = self.forward_batch(&[input.to_vec()])?;
        Ok(out.pop().unwrap_or_default())
    }
}
