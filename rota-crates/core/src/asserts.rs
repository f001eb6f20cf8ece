#[cfg(all(not(test), not(feature = "debug-checks")))]
pub const ROTA_ASSERT_LEVEL_DEFINITION: u8 = ROTA_ASSERT_SIMPLE;

#[cfg(any(test, feature = "debug-checks"))]
pub const ROTA_ASSERT_LEVEL_DEFINITION: u8 = ROTA_ASSERT_MODERATE;

pub const ROTA_ASSERT_SIMPLE: u8 = 1;
pub const ROTA_ASSERT_MODERATE: u8 = 2;

#[macro_export]
#[doc(hidden)]
macro_rules! rota_assert_moderate {
    ($($arg:tt)*) => {
        if $crate::asserts::ROTA_ASSERT_LEVEL_DEFINITION >= $crate::asserts::ROTA_ASSERT_MODERATE {
            assert!($($arg)*);
        }
    };
}
