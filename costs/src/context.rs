use crate::OperationCost;

/// A value paired with the cost of producing it.
#[must_use]
#[derive(Debug, Eq, PartialEq)]
pub struct CostContext<T> {
    /// The operation's return value.
    pub value: T,
    /// What the operation cost.
    pub cost: OperationCost,
}

impl<T> CostContext<T> {
    /// Move the cost into `acc_cost` and return the value.
    pub fn unwrap_add_cost(self, acc_cost: &mut OperationCost) -> T {
        *acc_cost += self.cost;
        self.value
    }

    /// Drop the cost and return the value.
    pub fn unwrap(self) -> T {
        self.value
    }

    /// Transform the value, keeping the cost.
    pub fn map<B>(self, f: impl FnOnce(T) -> B) -> CostContext<B> {
        CostContext {
            value: f(self.value),
            cost: self.cost,
        }
    }

    /// Add cost accumulated elsewhere.
    pub fn add_cost(mut self, cost: OperationCost) -> Self {
        self.cost += cost;
        self
    }
}

/// `Result` wrapped into a `CostContext`.
pub type CostResult<T, E> = CostContext<Result<T, E>>;

impl<T, E> CostResult<T, E> {
    /// Map the `Ok` value, keeping the cost.
    pub fn map_ok<B>(self, f: impl FnOnce(T) -> B) -> CostResult<B, E> {
        self.map(|result| result.map(f))
    }

    /// Map the error, keeping the cost.
    pub fn map_err<B>(self, f: impl FnOnce(E) -> B) -> CostResult<T, B> {
        self.map(|result| result.map_err(f))
    }

    /// Chain a costed computation on `Ok`, summing costs.
    pub fn flat_map_ok<B>(self, f: impl FnOnce(T) -> CostResult<B, E>) -> CostResult<B, E> {
        let mut cost = self.cost;
        let value = match self.value {
            Ok(x) => f(x).unwrap_add_cost(&mut cost),
            Err(e) => Err(e),
        };
        CostContext { value, cost }
    }
}

/// Wrap any value into a `CostContext`.
pub trait CostsExt {
    /// Attach `cost` to `self`.
    fn wrap_with_cost(self, cost: OperationCost) -> CostContext<Self>
    where
        Self: Sized,
    {
        CostContext { value: self, cost }
    }
}

impl<T> CostsExt for T {}

/// `?` for `CostResult`: adds the cost of the wrapped call to `$cost`, yields
/// the `Ok` value, or returns the error carrying everything accumulated so
/// far.
#[macro_export]
macro_rules! cost_return_on_error {
    ( &mut $cost:ident, $($body:tt)+ ) => {
        {
            use $crate::CostsExt;
            let result_with_cost = { $($body)+ };
            let result = result_with_cost.unwrap_add_cost(&mut $cost);
            match result {
                Ok(x) => x,
                Err(e) => return Err(e).wrap_with_cost($cost),
            }
        }
    };
}

/// `?` for a plain `Result` inside a function returning `CostResult`; the
/// early return carries the cost accumulated so far.
#[macro_export]
macro_rules! cost_return_on_error_no_add {
    ( &$cost:ident, $($body:tt)+ ) => {
        {
            use $crate::CostsExt;
            let result = { $($body)+ };
            match result {
                Ok(x) => x,
                Err(e) => return Err(e).wrap_with_cost($cost),
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loaded(bytes: u64) -> OperationCost {
        OperationCost::with_loaded_bytes(bytes)
    }

    #[test]
    fn test_flat_map_ok_sums_costs() {
        let initial: CostResult<u64, ()> = Ok(75).wrap_with_cost(loaded(3));
        let chained = initial.flat_map_ok(|x| Ok(x + 25).wrap_with_cost(loaded(7)));
        assert_eq!(chained.value, Ok(100));
        assert_eq!(chained.cost.storage_loaded_bytes, 10);
        assert_eq!(chained.cost.seek_count, 2);
    }

    #[test]
    fn test_flat_map_ok_skips_on_err() {
        let initial: CostResult<u64, &str> = Err("boom").wrap_with_cost(loaded(3));
        let chained = initial.flat_map_ok(|x| Ok(x + 1).wrap_with_cost(loaded(100)));
        assert_eq!(chained.value, Err("boom"));
        assert_eq!(chained.cost, loaded(3));
    }

    fn two_steps(fail_second: bool) -> CostResult<u64, &'static str> {
        let mut cost = OperationCost::default();
        let a = cost_return_on_error!(&mut cost, Ok::<u64, &str>(1).wrap_with_cost(loaded(4)));
        let b = cost_return_on_error!(
            &mut cost,
            if fail_second {
                Err("second").wrap_with_cost(loaded(5))
            } else {
                Ok(2).wrap_with_cost(loaded(5))
            }
        );
        Ok(a + b).wrap_with_cost(cost)
    }

    #[test]
    fn test_cost_return_on_error_keeps_accumulated_cost() {
        let ok = two_steps(false);
        assert_eq!(ok.value, Ok(3));
        assert_eq!(ok.cost.storage_loaded_bytes, 9);

        let failed = two_steps(true);
        assert_eq!(failed.value, Err("second"));
        assert_eq!(failed.cost.storage_loaded_bytes, 9);
        assert_eq!(failed.cost.seek_count, 2);
    }

    #[test]
    fn test_cost_return_on_error_no_add() {
        fn parse(input: &str) -> CostResult<u64, std::num::ParseIntError> {
            let cost = OperationCost::with_seek_count(1);
            let n = cost_return_on_error_no_add!(&cost, input.parse::<u64>());
            Ok(n).wrap_with_cost(cost)
        }
        assert_eq!(parse("12").value, Ok(12));
        let failed = parse("x");
        assert!(failed.value.is_err());
        assert_eq!(failed.cost.seek_count, 1);
    }
}
