use crate::*;

/// Наклон отрицательной части leaky ReLU
pub const LEAKY_RELU_SLOPE: f64 = 0.1;

/// Функция активации слоя.
/// Номера вариантов (`index`) совпадают с номерами в файлах моделей старого формата.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Activation {
    /// f(x) = x
    #[default]
    Identity,
    /// f(x) = x / (1 + |x|)
    FastSigmoid,
    /// f(x) = x < 0 ? 0 : x
    Relu,
    /// f(x) = x >= 0 ? x : 0.1 * x
    LeakyRelu,
    /// f(x) = tanh(x)
    Tanh,
}

impl Activation {
    /// Все функции в порядке номеров
    pub const ALL: [Activation; 5] = [
        Activation::Identity,
        Activation::FastSigmoid,
        Activation::Relu,
        Activation::LeakyRelu,
        Activation::Tanh,
    ];

    /// Расчет функции для одного значения.
    /// NaN и бесконечности проходят насквозь, без ограничений.
    #[inline]
    pub fn apply(self, x: f64) -> f64 {
        match self {
            Activation::Identity => x,
            Activation::FastSigmoid => x / (1.0 + x.abs()),
            Activation::Relu => {
                if x < 0.0 {
                    0.0
                } else {
                    x
                }
            }
            Activation::LeakyRelu => {
                if x >= 0.0 {
                    x
                } else {
                    x * LEAKY_RELU_SLOPE
                }
            }
            Activation::Tanh => x.tanh(),
        }
    }

    /// Номер функции
    pub fn index(self) -> usize {
        self as usize
    }

    /// Функция по номеру
    pub fn from_index(index: usize) -> Result<Self> {
        Self::ALL
            .get(index)
            .copied()
            .ok_or_else(|| Error::UnknownActivation(format!("index {index}")))
    }

    /// Короткое имя (для файлов модели и конфигов)
    pub fn id(self) -> &'static str {
        match self {
            Activation::Identity => "identity",
            Activation::FastSigmoid => "fast-sigmoid",
            Activation::Relu => "relu",
            Activation::LeakyRelu => "leaky-relu",
            Activation::Tanh => "tanh",
        }
    }

    /// Описание для пользователя
    pub fn description(self) -> &'static str {
        match self {
            Activation::Identity => "Stub activation function",
            Activation::FastSigmoid => "Fast sigmoid activation function",
            Activation::Relu => "ReLu activation function",
            Activation::LeakyRelu => "Leaky ReLu activation function",
            Activation::Tanh => "Tanh activation function",
        }
    }
}

impl fmt::Display for Activation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Activation {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|a| a.id() == s)
            .ok_or_else(|| Error::UnknownActivation(s.to_string()))
    }
}

/// Та же функция поэлементно над тензором (для расчета пакетами)
impl Module for Activation {
    fn forward(&self, xs: &Tensor) -> candle_core::Result<Tensor> {
        match self {
            Activation::Identity => Ok(xs.clone()),
            Activation::FastSigmoid => xs.div(&xs.abs()?.affine(1.0, 1.0)?),
            Activation::Relu => xs.relu(),
            Activation::LeakyRelu => candle_nn::ops::leaky_relu(xs, LEAKY_RELU_SLOPE),
            Activation::Tanh => xs.tanh(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn formulas() {
        assert_eq!(Activation::Identity.apply(-2.5), -2.5);
        assert_eq!(Activation::FastSigmoid.apply(1.0), 0.5);
        assert_eq!(Activation::FastSigmoid.apply(-3.0), -0.75);
        assert_eq!(Activation::Relu.apply(-3.0), 0.0);
        assert_eq!(Activation::Relu.apply(3.0), 3.0);
        assert_eq!(Activation::LeakyRelu.apply(2.0), 2.0);
        assert_relative_eq!(Activation::LeakyRelu.apply(-2.0), -0.2);
        assert_relative_eq!(Activation::Tanh.apply(0.5), 0.5f64.tanh());
        assert_eq!(Activation::Tanh.apply(0.0), 0.0);
    }

    #[test]
    fn nan_passes_through() {
        for a in Activation::ALL {
            assert!(a.apply(f64::NAN).is_nan(), "{a} swallowed NaN");
        }
        assert_eq!(Activation::Identity.apply(f64::INFINITY), f64::INFINITY);
        assert!(Activation::FastSigmoid.apply(f64::INFINITY).is_nan());
    }

    #[test]
    fn indexes() {
        for (i, a) in Activation::ALL.iter().enumerate() {
            assert_eq!(a.index(), i);
            assert_eq!(Activation::from_index(i).unwrap(), *a);
        }
        assert!(matches!(Activation::from_index(5), Err(Error::UnknownActivation(_))));
        assert_eq!(Activation::default(), Activation::Identity);
    }

    #[test]
    fn ids() {
        for a in Activation::ALL {
            assert_eq!(a.id().parse::<Activation>().unwrap(), a);
            assert_eq!(serde_json::to_string(&a).unwrap(), format!("\"{}\"", a.id()));
        }
        assert!(matches!("sigmoid".parse::<Activation>(), Err(Error::UnknownActivation(_))));
        let a: Activation = serde_json::from_str("\"leaky-relu\"").unwrap();
        assert_eq!(a, Activation::LeakyRelu);
        assert_eq!(Activation::Relu.description(), "ReLu activation function");
    }

    #[test]
    fn tensor_matches_scalar() {
        let xs = vec![-2.0f64, -0.5, 0.0, 0.5, 2.0];
        let t = Tensor::new(xs.clone(), &Device::Cpu).unwrap();
        for a in Activation::ALL {
            let actual: Vec<f64> = a.forward(&t).unwrap().to_vec1().unwrap();
            let expected: Vec<f64> = xs.iter().map(|x| a.apply(*x)).collect();
            assert_relative_eq!(actual.as_slice(), expected.as_slice(), epsilon = 1e-12);
        }
    }
}
