/// A cluster resource broker (e.g. `srun`) that wraps every command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResourceBroker {
    /// The broker executable.
    pub program: String,
    /// The flag announcing the number of threads the wrapped job uses.
    pub thread_flag: String,
    /// Memory per cpu, in MB.
    pub mem_per_cpu: Option<usize>,
}

impl Default for ResourceBroker {
    fn default() -> Self {
        ResourceBroker {
            program: "srun".to_string(),
            thread_flag: "--cpus-per-task".to_string(),
            mem_per_cpu: Some(27000),
        }
    }
}

impl ResourceBroker {
    /// The arguments to place in front of the wrapped command.
    pub fn prefix(&self, threads: Option<usize>) -> Vec<String> {
        let mut args = vec![self.program.clone()];
        if let Some(threads) = threads {
            args.push(self.thread_flag.clone());
            args.push(threads.to_string());
        }
        args.extend(optional_arg(&self.mem_per_cpu, "--mem-per-cpu"));
        args
    }

    /// Prefix `command` with the broker invocation.
    pub fn wrap(&self, command: &[String], threads: Option<usize>) -> Vec<String> {
        let mut argv = self.prefix(threads);
        argv.extend_from_slice(command);
        argv
    }
}

fn optional_arg<T: std::fmt::Display>(arg: &Option<T>, flag: &str) -> Vec<String> {
    arg.as_ref()
        .map(|x| vec![flag.to_string(), x.to_string()])
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_prefix() {
        let broker = ResourceBroker::default();
        assert_eq!(broker.prefix(None), ["srun", "--mem-per-cpu", "27000"]);
        assert_eq!(
            broker.prefix(Some(8)),
            ["srun", "--cpus-per-task", "8", "--mem-per-cpu", "27000"]
        );

        let broker = ResourceBroker {
            mem_per_cpu: None,
            ..ResourceBroker::default()
        };
        assert_eq!(broker.prefix(None), ["srun"]);
    }

    #[test]
    fn test_wrap() {
        let command = vec!["shovill".to_string(), "--cpus".to_string(), "4".to_string()];
        let argv = ResourceBroker::default().wrap(&command, Some(4));
        assert_eq!(
            argv,
            [
                "srun",
                "--cpus-per-task",
                "4",
                "--mem-per-cpu",
                "27000",
                "shovill",
                "--cpus",
                "4"
            ]
        );
    }
}
