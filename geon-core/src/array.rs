use crate::error::GeonError;

/// Dense row-major array of `f64` values.
///
/// An `Array` has no axis identities of its own: the node it belongs to
/// supplies them, and `shape[i]` is the length of the node's `i`-th axis.
#[derive(Debug, Clone, PartialEq)]
pub struct Array {
    shape: Vec<usize>,
    data: Vec<f64>,
}

impl Array {
    /// Creates an array, checking that `data` fills `shape` exactly.
    pub fn new(data: Vec<f64>, shape: Vec<usize>) -> Result<Self, GeonError> {
        let numel: usize = shape.iter().product();
        if numel != data.len() {
            return Err(GeonError::ArrayCreation {
                data_len: data.len(),
                shape,
            });
        }
        Ok(Array { shape, data })
    }

    pub fn scalar(value: f64) -> Self {
        Array {
            shape: Vec::new(),
            data: vec![value],
        }
    }

    pub fn full(shape: &[usize], value: f64) -> Self {
        let numel = shape.iter().product();
        Array {
            shape: shape.to_vec(),
            data: vec![value; numel],
        }
    }

    pub fn zeros(shape: &[usize]) -> Self {
        Self::full(shape, 0.0)
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn data(&self) -> &[f64] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [f64] {
        &mut self.data
    }

    pub fn into_data(self) -> Vec<f64> {
        self.data
    }

    pub fn numel(&self) -> usize {
        self.data.len()
    }

    /// The single value of a one-element array.
    pub fn item(&self) -> Result<f64, GeonError> {
        match self.data.as_slice() {
            [value] => Ok(*value),
            _ => Err(GeonError::NonScalar {
                shape: self.shape.clone(),
            }),
        }
    }

    /// Elementwise `self -= other`; shapes must match exactly.
    pub fn sub_assign(&mut self, other: &Array) -> Result<(), GeonError> {
        if self.shape != other.shape {
            return Err(GeonError::InternalError(format!(
                "Cannot subtract array of shape {:?} from shape {:?}",
                other.shape, self.shape
            )));
        }
        for (a, b) in self.data.iter_mut().zip(other.data.iter()) {
            *a -= *b;
        }
        Ok(())
    }
}

/// Row-major strides for `shape`.
pub(crate) fn calculate_strides(shape: &[usize]) -> Vec<usize> {
    let mut strides = vec![0; shape.len()];
    let mut stride = 1;
    for i in (0..shape.len()).rev() {
        strides[i] = stride;
        stride *= shape[i];
    }
    strides
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_checks_length() {
        assert!(Array::new(vec![1.0, 2.0, 3.0], vec![3]).is_ok());
        assert_eq!(
            Array::new(vec![1.0, 2.0], vec![3]),
            Err(GeonError::ArrayCreation {
                data_len: 2,
                shape: vec![3]
            })
        );
    }

    #[test]
    fn test_item_requires_single_element() {
        assert_eq!(Array::scalar(4.5).item(), Ok(4.5));
        assert_eq!(Array::full(&[1, 1], 2.0).item(), Ok(2.0));
        assert!(Array::zeros(&[2]).item().is_err());
    }

    #[test]
    fn test_strides() {
        assert_eq!(calculate_strides(&[2, 3, 4]), vec![12, 4, 1]);
        assert_eq!(calculate_strides(&[]), Vec::<usize>::new());
    }

    #[test]
    fn test_sub_assign() {
        let mut a = Array::new(vec![1.0, 2.0], vec![2]).unwrap();
        a.sub_assign(&Array::new(vec![0.5, 0.5], vec![2]).unwrap()).unwrap();
        assert_eq!(a.data(), &[0.5, 1.5]);
        assert!(a.sub_assign(&Array::zeros(&[3])).is_err());
    }
}
