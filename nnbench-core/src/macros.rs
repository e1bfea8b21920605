// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Declarative benchmark registration.

/// Build a [`Benchmark`](crate::Benchmark) and insert it into a registry.
///
/// Evaluates to `BenchResult<()>`; a duplicate triple is an error.
///
/// ```ignore
/// nnbench_benchmark!(
///     Box::new(PassthroughExecutor::new(Runtime::Cpu, inputs, outputs, settings)),
///     "mobilenet_v1", "passthrough", "CPU", "mobilenet_v1",
///     ["input"], ["mobilenet_in.bin"], [[1, 224, 224, 3]],
///     ["output"], [[1, 224, 224, 3]]
/// )?;
/// ```
///
/// Prefix with `in <registry>;` to target a registry other than the
/// process-wide one.
#[macro_export]
macro_rules! nnbench_benchmark {
    (in $registry:expr; $executor:expr, $model_name:expr, $framework:expr, $runtime:expr,
     $model_file:expr, $input_names:expr, $input_files:expr, $input_shapes:expr
     $(, $output_names:expr, $output_shapes:expr)? $(,)?) => {{
        let register = || -> $crate::BenchResult<()> {
            let key = $crate::BenchmarkKey::parse($model_name, $framework, $runtime)?;
            let benchmark = $crate::Benchmark::new($executor, key, $model_file)?.with_inputs(
                $input_names
                    .iter()
                    .map(|n| ::std::string::ToString::to_string(n))
                    .collect::<::std::vec::Vec<::std::string::String>>(),
                $input_files
                    .iter()
                    .map(|f| ::std::path::PathBuf::from(::std::string::ToString::to_string(f)))
                    .collect::<::std::vec::Vec<::std::path::PathBuf>>(),
                $input_shapes
                    .iter()
                    .map(|s| s.to_vec())
                    .collect::<::std::vec::Vec<::std::vec::Vec<usize>>>(),
            )?;
            $(
            let benchmark = benchmark.with_outputs(
                $output_names
                    .iter()
                    .map(|n| ::std::string::ToString::to_string(n))
                    .collect::<::std::vec::Vec<::std::string::String>>(),
                $output_shapes
                    .iter()
                    .map(|s| s.to_vec())
                    .collect::<::std::vec::Vec<::std::vec::Vec<usize>>>(),
            )?;
            )?
            $registry.register(benchmark)
        };
        register()
    }};
    ($executor:expr, $model_name:expr, $framework:expr, $runtime:expr,
     $model_file:expr, $input_names:expr, $input_files:expr, $input_shapes:expr
     $(, $output_names:expr, $output_shapes:expr)? $(,)?) => {
        $crate::nnbench_benchmark!(
            in $crate::registry::global();
            $executor, $model_name, $framework, $runtime,
            $model_file, $input_names, $input_files, $input_shapes
            $(, $output_names, $output_shapes)?
        )
    };
}
