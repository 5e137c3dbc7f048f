/// Результат операций библиотеки
pub type Result<T> = std::result::Result<T, Error>;

/// Ошибки настройки и расчета сети.
/// Любая ошибка означает, что состояние сети не изменилось.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Длина вектора не совпадает с длиной, заданной топологией
    #[error("{what}: expected length {expected}, got {actual}")]
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Длина плоского буфера весов не совпадает с количеством весов сети
    #[error("flat weight buffer: expected {expected} values, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    /// Недопустимая топология или нарушение ограничений построителя
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// Неизвестная функция активации (по имени или номеру)
    #[error("unknown activation function: {0}")]
    UnknownActivation(String),

    #[error("tensor error: {0}")]
    Tensor(#[from] candle_core::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Проверка длины: `Ok`, если совпадает, иначе `ShapeMismatch`
    pub(crate) fn check_len(what: &'static str, expected: usize, actual: usize) -> Result<()> {
        if expected == actual {
            Ok(())
        } else {
            Err(Error::ShapeMismatch { what, expected, actual })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_len() {
        assert!(Error::check_len("bias vector", 3, 3).is_ok());
        match Error::check_len("bias vector", 3, 2) {
            Err(Error::ShapeMismatch { what, expected, actual }) => {
                assert_eq!(what, "bias vector");
                assert_eq!(expected, 3);
                assert_eq!(actual, 2);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn messages() {
        let e = Error::LengthMismatch { expected: 12, actual: 11 };
        assert_eq!(e.to_string(), "flat weight buffer: expected 12 values, got 11");
        let e = Error::ShapeMismatch { what: "input layer", expected: 2, actual: 3 };
        assert_eq!(e.to_string(), "input layer: expected length 2, got 3");
    }
}
