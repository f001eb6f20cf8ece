use rota_solver::error::RotaError;

pub(crate) type RotaResult<T> = Result<T, RotaError>;
